//! # metabridge-mcp
//!
//! MCP (Model Context Protocol) server that exposes a BI service as a fixed
//! set of tools for AI agents:
//!
//! | Tool          | Upstream                               | Cached |
//! |---------------|----------------------------------------|--------|
//! | `retrieve`    | one `GET` per id, in bounded waves     | yes    |
//! | `list`        | `GET /api/{resource}`                  | no     |
//! | `search`      | `GET /api/search`                      | no     |
//! | `execute`     | saved question or native query         | no     |
//! | `clear_cache` | none                                   |        |
//!
//! Tool arguments are checked against each tool's JSON schema before
//! dispatch. Bad arguments become JSON-RPC errors (`-32602`); upstream
//! failures come back as tool results with `isError: true`.
//!
//! ## Example Usage
//!
//! ```ignore
//! use metabridge_client::MetabaseClient;
//! use metabridge_core::MetabridgeConfig;
//! use metabridge_mcp::McpServer;
//! use std::sync::Arc;
//!
//! let config = MetabridgeConfig::from_file("metabridge.yaml")?;
//! let client = Arc::new(MetabaseClient::new(&config.upstream)?);
//! McpServer::new(&config, client)?.run().await?;
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::McpError;
pub use executor::{ExecutionResult, ToolExecutor};
pub use http_transport::{HttpServer, create_router};
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ToolAnnotations,
    ToolContent, ToolDefinition,
};
pub use server::McpServer;
pub use tools::ToolRegistry;
