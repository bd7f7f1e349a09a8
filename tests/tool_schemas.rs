//! Integration tests for MCP tool schemas.
//!
//! These tests verify that the tools exposed by the reframe-mind MCP server
//! advertise the parameters their handlers accept.

use std::sync::Arc;

use reframe_mind::config::Config;
use reframe_mind::corpus::CaseStore;
use reframe_mind::embeddings::FakeEmbedder;
use reframe_mind::schemas::{classify_schema, control_schema, reframe_schema, score_schema};
use reframe_mind::server::{ControlParams, ReframeParams, ReframeServer, ScoreParams};
use rmcp::handler::server::ServerHandler;
use serde_json::{Map, Value, json};

fn required(schema: &Map<String, Value>) -> Vec<&str> {
    schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect()
}

#[test]
fn test_classify_schema_requires_thought_only() {
    let schema = classify_schema();
    assert_eq!(schema["type"], "object");
    assert!(schema["properties"]["thought"].is_object());
    assert!(schema["properties"]["situation"].is_object());
    assert_eq!(required(&schema), vec!["thought"]);
}

#[test]
fn test_reframe_schema_k_is_positive() {
    let schema = reframe_schema();
    assert_eq!(schema["properties"]["k"]["type"], "integer");
    assert_eq!(schema["properties"]["k"]["minimum"], 1);
    assert_eq!(schema["properties"]["k"]["default"], 5);
    assert_eq!(required(&schema), vec!["thought"]);
}

#[test]
fn test_score_schema_requires_reframe_and_thought() {
    let schema = score_schema();
    let req = required(&schema);
    assert_eq!(req.len(), 2);
    assert!(req.contains(&"reframe"));
    assert!(req.contains(&"thought"));
}

#[test]
fn test_control_schema_lists_three_attributes() {
    let schema = control_schema();
    let attributes = schema["properties"]["attribute"]["enum"].as_array().unwrap();
    assert_eq!(attributes.len(), 3);
    for name in ["empathy", "actionability", "specificity"] {
        assert!(attributes.contains(&json!(name)));
    }
    assert!(required(&schema).contains(&"attribute"));
}

#[test]
fn test_params_accept_schema_shaped_input() {
    let reframe: ReframeParams =
        serde_json::from_value(json!({"thought": "I will fail"})).unwrap();
    assert_eq!(reframe.situation, "");
    assert_eq!(reframe.k, None);

    let score: ScoreParams =
        serde_json::from_value(json!({"reframe": "I can try", "thought": "I will fail"})).unwrap();
    assert_eq!(score.situation, "");

    let control: ControlParams = serde_json::from_value(
        json!({"reframe": "I can try", "attribute": "empathy"}),
    )
    .unwrap();
    assert_eq!(control.thought, "");

    let missing: Result<ScoreParams, _> = serde_json::from_value(json!({"reframe": "I can try"}));
    assert!(missing.is_err());
}

#[tokio::test]
async fn test_server_info_advertises_tools() {
    struct Silent;

    #[async_trait::async_trait]
    impl reframe_mind::clients::TextGenerator for Silent {
        async fn complete(
            &self,
            _request: &reframe_mind::clients::CompletionRequest,
        ) -> reframe_mind::Result<String> {
            Ok(String::new())
        }

        fn model(&self) -> &str {
            "silent"
        }
    }

    let server = ReframeServer::with_gateways(
        Config::default(),
        CaseStore::from_records(vec![]),
        Arc::new(Silent),
        Arc::new(FakeEmbedder::new(None)),
    )
    .unwrap();

    let info = server.get_info();
    assert_eq!(info.server_info.name, "reframe-mind");
    assert!(info.capabilities.tools.is_some());
    assert_eq!(server.model(), "silent");
}
