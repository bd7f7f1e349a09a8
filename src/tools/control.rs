//! reframe_control tool handler

use rmcp::model::{CallToolRequestParam, CallToolResult};

use crate::error::Result;
use crate::server::{ControlParams, ReframeServer};

impl ReframeServer {
    /// Handle the reframe_control tool call
    pub async fn handle_control(&self, request: CallToolRequestParam) -> Result<CallToolResult> {
        let params: ControlParams = super::parse_params(request)?;
        let outcome = self.control(params).await?;
        Ok(CallToolResult::structured(serde_json::to_value(outcome)?))
    }
}
