//! `jules-mcp` binary.
//!
//! Speaks JSON-RPC over stdio; logs go to stderr. Configure with `--api-key`/`JULES_API_KEY` and
//! optionally `--api-url`/`JULES_API_URL`.

use anyhow::Context as _;
use clap::Parser as _;
use jules_api::JulesClient;
use jules_mcp::resources::DocsResource;
use jules_mcp::{Cli, JulesMcpServer, logging};
use rmcp::ServiceExt as _;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(&cli.log_level, cli.log_format) {
        eprintln!("jules-mcp: {e:#}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(error = %format!("{e:#}"), "jules-mcp failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.api_config()?;
    if !config.has_api_key() {
        tracing::warn!("JULES_API_KEY is not set; tool calls will fail until it is configured");
    }
    let base_url = config.base_url().to_string();
    let client = JulesClient::new(config)?;
    let docs = cli
        .docs_path
        .map_or_else(DocsResource::bundled, DocsResource::from_file);
    let server = JulesMcpServer::new(client, docs);

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("start MCP stdio service")?;
    tracing::info!(base_url = %base_url, "Jules MCP server ready");

    service.waiting().await.context("MCP service terminated")?;
    Ok(())
}
