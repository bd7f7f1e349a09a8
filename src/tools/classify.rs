//! reframe_classify tool handler

use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde_json::json;

use crate::error::Result;
use crate::server::{ClassifyParams, ReframeServer};

impl ReframeServer {
    /// Handle the reframe_classify tool call
    pub async fn handle_classify(&self, request: CallToolRequestParam) -> Result<CallToolResult> {
        let params: ClassifyParams = super::parse_params(request)?;
        let result = self.classify(params).await?;

        Ok(CallToolResult::structured(json!({
            "thinking_trap": result.label_with_confidence,
            "label": result.label(),
            "confidence_percent": result.confidence_percent(),
        })))
    }
}
