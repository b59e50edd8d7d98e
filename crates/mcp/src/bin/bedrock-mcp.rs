// Standalone MCP server binary

use anyhow::{Context, Result};
use bedrock_client::BedrockApi;
use bedrock_mcp::{register_all, Cli, McpServer, ToolRegistry};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();

    tracing::info!(base_url = %cli.base_url, "Bedrock MCP server starting");
    if !cli.has_credentials() {
        tracing::warn!("No username/password configured; authenticated tools will fail");
    }

    let client = cli
        .build_client()
        .context("Invalid Bedrock Server Manager configuration")?;
    let api: Arc<dyn BedrockApi> = Arc::new(client);

    let mut registry = ToolRegistry::new();
    register_all(&mut registry, api);
    tracing::info!("Registered {} tools", registry.len());

    McpServer::new(registry).run_stdio().await
}
