//! reframe_generate tool handler

use rmcp::model::{CallToolRequestParam, CallToolResult};

use crate::error::Result;
use crate::server::{ReframeParams, ReframeServer};

impl ReframeServer {
    /// Handle the reframe_generate tool call
    pub async fn handle_reframe(&self, request: CallToolRequestParam) -> Result<CallToolResult> {
        let params: ReframeParams = super::parse_params(request)?;
        let outcome = self.reframe(params).await?;
        Ok(CallToolResult::structured(serde_json::to_value(outcome)?))
    }
}
