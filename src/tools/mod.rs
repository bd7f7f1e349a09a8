//! Tool handlers for the reframe-mind MCP server

pub mod classify;
pub mod control;
pub mod reframe;
pub mod score;

use rmcp::model::CallToolRequestParam;
use serde::de::DeserializeOwned;

use crate::error::{ReframeError, Result};

/// Decode tool arguments into a typed parameter struct.
pub(crate) fn parse_params<T: DeserializeOwned>(request: CallToolRequestParam) -> Result<T> {
    let args = request
        .arguments
        .ok_or_else(|| ReframeError::InvalidParams {
            message: "Missing parameters".into(),
        })?;
    serde_json::from_value(serde_json::Value::Object(args)).map_err(|e| {
        ReframeError::InvalidParams {
            message: format!("Invalid parameters: {}", e),
        }
    })
}
