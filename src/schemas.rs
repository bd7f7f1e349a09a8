//! JSON input schemas for the MCP tools

use serde_json::{Map, Value, json};
use std::sync::Arc;

fn to_map(schema: Value) -> Arc<Map<String, Value>> {
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

pub fn classify_schema() -> Arc<Map<String, Value>> {
    to_map(json!({
        "type": "object",
        "properties": {
            "thought": {"type": "string", "description": "The distorted thought"},
            "situation": {"type": "string", "description": "What was happening", "default": ""}
        },
        "required": ["thought"]
    }))
}

pub fn reframe_schema() -> Arc<Map<String, Value>> {
    to_map(json!({
        "type": "object",
        "properties": {
            "thought": {"type": "string"},
            "situation": {"type": "string", "default": ""},
            "k": {"type": "integer", "minimum": 1, "default": 5, "description": "Number of similar cases used as examples"}
        },
        "required": ["thought"]
    }))
}

pub fn score_schema() -> Arc<Map<String, Value>> {
    to_map(json!({
        "type": "object",
        "properties": {
            "reframe": {"type": "string"},
            "thought": {"type": "string"},
            "situation": {"type": "string", "default": ""}
        },
        "required": ["reframe", "thought"]
    }))
}

pub fn control_schema() -> Arc<Map<String, Value>> {
    to_map(json!({
        "type": "object",
        "properties": {
            "reframe": {"type": "string"},
            "attribute": {"type": "string", "enum": ["empathy", "actionability", "specificity"]},
            "thought": {"type": "string", "default": ""},
            "situation": {"type": "string", "default": ""}
        },
        "required": ["reframe", "attribute"]
    }))
}
