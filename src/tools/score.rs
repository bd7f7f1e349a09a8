//! reframe_score tool handler

use rmcp::model::{CallToolRequestParam, CallToolResult};

use crate::error::Result;
use crate::server::{ReframeServer, ScoreParams};

impl ReframeServer {
    /// Handle the reframe_score tool call
    pub async fn handle_score(&self, request: CallToolRequestParam) -> Result<CallToolResult> {
        let params: ScoreParams = super::parse_params(request)?;
        let scores = self.score(params).await?;
        Ok(CallToolResult::structured(serde_json::to_value(scores)?))
    }
}
