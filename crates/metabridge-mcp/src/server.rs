//! MCP server implementation.
//!
//! This module provides the main MCP server that handles tool discovery
//! and execution over stdio or HTTP.

use crate::catalog;
use crate::error::{McpError, codes};
use crate::executor::ToolExecutor;
use crate::http_transport::HttpServer;
use crate::protocol::*;
use crate::tools::ToolRegistry;
use metabridge_cache::CacheStats;
use metabridge_client::BiService;
use metabridge_core::config::{McpConfig, MetabridgeConfig, Transport};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// The MCP server.
pub struct McpServer {
    config: McpConfig,
    tools: ToolRegistry,
    executor: ToolExecutor,
}

impl McpServer {
    /// Create a server exposing the tool catalog backed by `service`.
    pub fn new<S>(config: &MetabridgeConfig, service: Arc<S>) -> Result<Self, McpError>
    where
        S: BiService + 'static,
    {
        let tools = catalog::registry(config.retrieval.max_ids_per_request);
        let executor =
            ToolExecutor::new(service, &config.cache, config.retrieval.clone(), &tools)?;

        Ok(Self {
            config: config.mcp.clone(),
            tools,
            executor,
        })
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    pub fn cache_stats(&self) -> Vec<CacheStats> {
        self.executor.cache_stats()
    }

    /// Start the MCP server.
    pub async fn run(self) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http => self.run_http().await,
        }
    }

    /// Run the server with stdio transport: one JSON-RPC message per line.
    async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!(tools = self.tools.len(), "Starting MCP server with stdio transport");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some(response) = self.handle_line(line).await else {
                continue;
            };
            let mut payload = serde_json::to_string(&response)?;
            payload.push('\n');
            stdout.write_all(payload.as_bytes()).await?;
            stdout.flush().await?;
        }

        tracing::info!("stdin closed, MCP server exiting");
        Ok(())
    }

    /// Run the server with HTTP transport.
    async fn run_http(self) -> Result<(), McpError> {
        let addr = self.config.bind_addr();
        HttpServer::new(addr, Arc::new(self)).run().await
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) if request.is_notification() => {
                tracing::debug!(method = %request.method, "Received notification");
                None
            }
            Ok(request) => Some(self.handle_request(request).await),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON-RPC message");
                Some(JsonRpcResponse::error(
                    None,
                    codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        if request.jsonrpc != "2.0" {
            let error = McpError::InvalidRequest(format!(
                "unsupported jsonrpc version: {}",
                request.jsonrpc
            ));
            return JsonRpcResponse::error(id, error.code(), error.to_string());
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": "metabridge",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.tools.list() }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        codes::INVALID_PARAMS,
                        format!("Invalid params: {}", e),
                    );
                }
            },
            None => return JsonRpcResponse::error(id, codes::INVALID_PARAMS, "Missing params"),
        };

        let Some(tool) = self.tools.get(&params.name) else {
            let error = McpError::ToolNotFound { name: params.name };
            return JsonRpcResponse::error(id, error.code(), error.to_string());
        };

        match self.executor.execute(tool, params.arguments).await {
            Ok(result) => {
                if !result.success {
                    tracing::warn!(tool = %tool.name, error = %result.text(), "Tool call failed");
                }
                let response = CallToolResponse::from(result);
                match serde_json::to_value(&response) {
                    Ok(value) => JsonRpcResponse::success(id, value),
                    Err(e) => {
                        JsonRpcResponse::error(id, codes::INTERNAL_ERROR, e.to_string())
                    }
                }
            }
            Err(error) => {
                tracing::debug!(tool = %tool.name, error = %error, "Rejected tool call");
                JsonRpcResponse::error(id, error.code(), error.to_string())
            }
        }
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}
