//! Shared test infrastructure: a scripted BI service and request helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use metabridge_cache::{ResourceLoader, UpstreamError};
use metabridge_client::BiService;
use metabridge_core::{MetabridgeConfig, ResourceType};
use metabridge_mcp::{JsonRpcRequest, JsonRpcResponse, McpServer};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory BI service. Every resource id exists unless marked missing.
#[derive(Default)]
pub struct FakeBi {
    missing: Mutex<HashSet<(ResourceType, u64)>>,
    down: AtomicBool,
    loads: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl FakeBi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn mark_missing(&self, resource: ResourceType, id: u64) {
        self.missing.lock().insert((resource, id));
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn check_up(&self) -> Result<(), UpstreamError> {
        if self.down.load(Ordering::SeqCst) {
            Err(UpstreamError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ResourceLoader for FakeBi {
    async fn load(&self, resource: ResourceType, id: u64) -> Result<Value, UpstreamError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.check_up()?;
        if self.missing.lock().contains(&(resource, id)) {
            return Err(UpstreamError::Status {
                status: 404,
                body: "Not found.".to_string(),
            });
        }
        Ok(json!({
            "id": id,
            "model": resource.as_str(),
            "name": format!("{} {}", resource, id),
        }))
    }
}

#[async_trait]
impl BiService for FakeBi {
    async fn list(&self, resource: ResourceType) -> Result<Value, UpstreamError> {
        self.calls.lock().push(format!("list {}", resource));
        self.check_up()?;
        Ok(json!({ "data": [{ "id": 1, "model": resource.as_str() }] }))
    }

    async fn search(&self, query: &str, models: &[String]) -> Result<Value, UpstreamError> {
        self.calls.lock().push(format!("search {}", query));
        self.check_up()?;
        Ok(json!({ "data": [], "query": query, "models": models }))
    }

    async fn execute_card(&self, card_id: u64) -> Result<Value, UpstreamError> {
        self.calls.lock().push(format!("execute_card {}", card_id));
        self.check_up()?;
        Ok(json!({ "card_id": card_id, "row_count": 1 }))
    }

    async fn execute_query(&self, database_id: u64, query: &str) -> Result<Value, UpstreamError> {
        self.calls.lock().push(format!("execute_query {}", database_id));
        self.check_up()?;
        Ok(json!({ "database": database_id, "query": query }))
    }
}

pub fn server_with(service: Arc<FakeBi>) -> McpServer {
    McpServer::new(&MetabridgeConfig::default(), service).unwrap()
}

pub fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
    JsonRpcRequest::new(id, method, params)
}

pub async fn call_tool(server: &McpServer, name: &str, arguments: Value) -> JsonRpcResponse {
    server
        .handle_request(request(
            1,
            "tools/call",
            Some(json!({ "name": name, "arguments": arguments })),
        ))
        .await
}

/// `(isError, text)` of a successful JSON-RPC tool call.
pub fn tool_output(response: &JsonRpcResponse) -> (bool, String) {
    assert!(
        response.error.is_none(),
        "expected a tool result, got {:?}",
        response.error
    );
    let result = response.result.as_ref().unwrap();
    let text = result["content"][0]["text"].as_str().unwrap().to_string();
    (result["isError"].as_bool().unwrap(), text)
}

/// Parsed JSON body of a successful, non-error tool result.
pub fn tool_json(response: &JsonRpcResponse) -> Value {
    let (is_error, text) = tool_output(response);
    assert!(!is_error, "tool reported an error: {}", text);
    serde_json::from_str(&text).unwrap()
}

pub fn error_code(response: &JsonRpcResponse) -> i32 {
    response
        .error
        .as_ref()
        .map(|e| e.code)
        .unwrap_or_else(|| panic!("expected an error, got {:?}", response.result))
}
