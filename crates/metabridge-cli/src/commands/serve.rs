//! `metabridge serve` - start the MCP server.

use anyhow::{Context, Result};
use metabridge_client::MetabaseClient;
use metabridge_core::Transport;
use metabridge_mcp::McpServer;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(
    config: Option<PathBuf>,
    transport: Option<Transport>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = super::load_config(config)?;
    if let Some(transport) = transport {
        config.mcp.transport = transport;
    }
    if let Some(port) = port {
        config.mcp.port = port;
    }

    let client = MetabaseClient::new(&config.upstream).context("Failed to create BI client")?;
    let server = McpServer::new(&config, Arc::new(client))?;

    tracing::info!(
        upstream = %config.upstream.base_url,
        transport = ?config.mcp.transport,
        ttl_ms = config.cache.ttl_ms,
        max_ids = config.retrieval.max_ids_per_request,
        "Starting metabridge"
    );
    if config.mcp.is_http() {
        tracing::info!(addr = %config.mcp.bind_addr(), "HTTP transport selected");
    }

    server.run().await?;
    Ok(())
}
