use crate::server::ReframeServer;
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, InitializeRequestParam,
        InitializeResult, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo, Tool, ToolsCapability,
    },
    service::{RequestContext, RoleServer},
};
use tracing::info;

impl ServerHandler for ReframeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "reframe-mind".to_string(),
                title: Some("Reframe Mind".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
                icons: None,
            },
            instructions: Some(
                "Classify a distorted thought, generate reframes from similar cases, score them, \
                 and steer one toward more empathy, actionability or specificity."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<InitializeResult, McpError> {
        let mut info = self.get_info();
        info.protocol_version = request.protocol_version.clone();
        Ok(info)
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        info!("tools/list requested");

        let tools = vec![
            Tool {
                name: "reframe_classify".into(),
                title: Some("Classify Thinking Trap".into()),
                description: Some(
                    "Label a thought with its cognitive distortion and a confidence-like suffix"
                        .into(),
                ),
                input_schema: crate::schemas::classify_schema(),
                icons: None,
                annotations: None,
                output_schema: None,
                meta: None,
            },
            Tool {
                name: "reframe_generate".into(),
                title: Some("Generate Reframes".into()),
                description: Some(
                    "Retrieve similar cases and generate several candidate reframes".into(),
                ),
                input_schema: crate::schemas::reframe_schema(),
                icons: None,
                annotations: None,
                output_schema: None,
                meta: None,
            },
            Tool {
                name: "reframe_score".into(),
                title: Some("Score Reframe".into()),
                description: Some(
                    "Score a reframe for specificity, actionability, empathy and positivity"
                        .into(),
                ),
                input_schema: crate::schemas::score_schema(),
                icons: None,
                annotations: None,
                output_schema: None,
                meta: None,
            },
            Tool {
                name: "reframe_control".into(),
                title: Some("Steer Reframe".into()),
                description: Some(
                    "Rewrite a reframe to be more empathic, actionable or specific".into(),
                ),
                input_schema: crate::schemas::control_schema(),
                icons: None,
                annotations: None,
                output_schema: None,
                meta: None,
            },
        ];

        Ok(ListToolsResult {
            tools,
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        match request.name.as_ref() {
            "reframe_classify" => self.handle_classify(request).await.map_err(|e| e.into()),
            "reframe_generate" => self.handle_reframe(request).await.map_err(|e| e.into()),
            "reframe_score" => self.handle_score(request).await.map_err(|e| e.into()),
            "reframe_control" => self.handle_control(request).await.map_err(|e| e.into()),
            _ => Err(McpError {
                code: rmcp::model::ErrorCode::METHOD_NOT_FOUND,
                message: format!("Unknown tool: {}", request.name).into(),
                data: None,
            }),
        }
    }
}
