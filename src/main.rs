use anyhow::Result;
use reframe_mind::{config::Config, server::ReframeServer};
use rmcp::{ServiceExt, transport::stdio};
use tracing::info;

mod http;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // stdout is the MCP channel in stdio mode, so logs always go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(config.runtime.log_level.as_str())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!(
        "Starting reframe-mind (model={}, embeddings={}, transport={})",
        config.system.chat_model, config.system.embedding_provider, config.runtime.transport
    );

    let server = ReframeServer::new(config)?;
    let cases = server.dataset().len();
    info!("Case corpus ready: {} cases", cases);

    let transport = server.config.runtime.transport.clone();
    match transport.as_str() {
        "stdio" => {
            info!("Serving MCP tools over stdio");
            let service = server.serve(stdio()).await?;
            service.waiting().await?;
        }
        "http" => http::start_http_server(server).await?,
        other => anyhow::bail!("Unknown transport '{}' (expected http or stdio)", other),
    }

    Ok(())
}
