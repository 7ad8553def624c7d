//! Tool execution engine.
//!
//! This module handles the actual execution of MCP tools:
//! - Validating arguments against each tool's input schema
//! - Routing `retrieve` through the cached retrieval engine
//! - Passing `list`, `search` and `execute` straight to the upstream
//! - Formatting results as tool content
//!
//! Invalid arguments surface as [`McpError`] (a JSON-RPC error). Failures
//! that happen while talking to the upstream are reported inside the tool
//! result with `isError: true`.

use crate::catalog;
use crate::error::McpError;
use crate::protocol::{CallToolResponse, ToolContent, ToolDefinition};
use crate::tools::ToolRegistry;
use chrono::Utc;
use jsonschema::Validator;
use metabridge_cache::{
    BatchResult, CacheStats, ResourceLoader, RetrievalEngine, RetrievalError, UpstreamError,
};
use metabridge_client::BiService;
use metabridge_core::{CacheConfig, ResourceType, RetrievalConfig, ValidationError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

/// Result of a tool execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether the execution was successful.
    pub success: bool,
    /// The result content.
    pub content: Vec<ToolContent>,
}

impl ExecutionResult {
    /// Create a successful result with JSON content.
    pub fn success_json(value: Value) -> Self {
        Self {
            success: true,
            content: vec![ToolContent::json(&value)],
        }
    }

    /// Create a successful result with plain text.
    pub fn success_text(text: impl Into<String>) -> Self {
        Self {
            success: true,
            content: vec![ToolContent::text(text)],
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: vec![ToolContent::text(message)],
        }
    }

    /// The first content block as text.
    pub fn text(&self) -> &str {
        self.content.first().map(ToolContent::as_text).unwrap_or("")
    }
}

impl From<ExecutionResult> for CallToolResponse {
    fn from(result: ExecutionResult) -> Self {
        CallToolResponse {
            content: result.content,
            is_error: !result.success,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RetrieveArgs {
    resource: String,
    ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct ListArgs {
    resource: String,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ExecuteArgs {
    card_id: Option<u64>,
    database_id: Option<u64>,
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClearCacheArgs {
    resource: Option<String>,
}

/// The tool executor runs tools against the retrieval engine and upstream.
pub struct ToolExecutor {
    engine: RetrievalEngine,
    service: Arc<dyn BiService>,
    validators: HashMap<String, Validator>,
}

impl ToolExecutor {
    /// Create an executor for the tools in `tools`. Fails if a tool's input
    /// schema does not compile.
    pub fn new<S>(
        service: Arc<S>,
        cache: &CacheConfig,
        retrieval: RetrievalConfig,
        tools: &ToolRegistry,
    ) -> Result<Self, McpError>
    where
        S: BiService + 'static,
    {
        let loader: Arc<dyn ResourceLoader> = service.clone();
        let engine = RetrievalEngine::new(loader, cache, retrieval);

        let mut validators = HashMap::new();
        for tool in tools.list() {
            let validator = jsonschema::validator_for(&tool.input_schema).map_err(|e| {
                McpError::StartupFailed(format!("invalid input schema for {}: {}", tool.name, e))
            })?;
            validators.insert(tool.name.clone(), validator);
        }

        Ok(Self {
            engine,
            service,
            validators,
        })
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    pub fn cache_stats(&self) -> Vec<CacheStats> {
        self.engine.cache_stats()
    }

    /// Execute a tool.
    pub async fn execute(
        &self,
        tool: &ToolDefinition,
        arguments: Value,
    ) -> Result<ExecutionResult, McpError> {
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };
        self.validate_arguments(&tool.name, &arguments)?;

        tracing::debug!(tool = %tool.name, "Executing tool");

        match tool.name.as_str() {
            catalog::RETRIEVE => self.retrieve(parse_args(&tool.name, arguments)?).await,
            catalog::LIST => self.list(parse_args(&tool.name, arguments)?).await,
            catalog::SEARCH => self.search(parse_args(&tool.name, arguments)?).await,
            catalog::EXECUTE => self.run_query(parse_args(&tool.name, arguments)?).await,
            catalog::CLEAR_CACHE => self.clear_cache(parse_args(&tool.name, arguments)?),
            other => Err(McpError::ToolNotFound {
                name: other.to_string(),
            }),
        }
    }

    fn validate_arguments(&self, tool: &str, arguments: &Value) -> Result<(), McpError> {
        let Some(validator) = self.validators.get(tool) else {
            return Err(McpError::ToolNotFound {
                name: tool.to_string(),
            });
        };

        let problems: Vec<String> = validator
            .iter_errors(arguments)
            .map(|error| {
                let path = error.instance_path().to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{}: {}", path, error)
                }
            })
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(McpError::InvalidArguments {
                tool: tool.to_string(),
                reason: problems.join("; "),
            })
        }
    }

    async fn retrieve(&self, args: RetrieveArgs) -> Result<ExecutionResult, McpError> {
        let resource = parse_resource(catalog::RETRIEVE, &args.resource)?;

        match self.engine.retrieve_many(resource, &args.ids).await {
            Ok(batch) => Ok(ExecutionResult::success_json(retrieve_response(&batch))),
            Err(RetrievalError::Validation(e)) => Err(McpError::validation(catalog::RETRIEVE, e)),
            Err(e @ RetrievalError::AllFailed { .. }) => Ok(ExecutionResult::error(e.to_string())),
        }
    }

    async fn list(&self, args: ListArgs) -> Result<ExecutionResult, McpError> {
        let resource = parse_resource(catalog::LIST, &args.resource)?;
        if !resource.is_listable() {
            return Err(McpError::validation(
                catalog::LIST,
                ValidationError::UnsupportedResource(resource.to_string()),
            ));
        }

        Ok(upstream_result(self.service.list(resource).await))
    }

    async fn search(&self, args: SearchArgs) -> Result<ExecutionResult, McpError> {
        Ok(upstream_result(
            self.service.search(&args.query, &args.models).await,
        ))
    }

    async fn run_query(&self, args: ExecuteArgs) -> Result<ExecutionResult, McpError> {
        let result = match (args.card_id, args.database_id, args.query) {
            (Some(card_id), None, None) => self.service.execute_card(card_id).await,
            (None, Some(database_id), Some(query)) => {
                self.service.execute_query(database_id, &query).await
            }
            _ => {
                return Err(McpError::InvalidArguments {
                    tool: catalog::EXECUTE.to_string(),
                    reason: "expected either card_id, or database_id together with query"
                        .to_string(),
                });
            }
        };
        Ok(upstream_result(result))
    }

    fn clear_cache(&self, args: ClearCacheArgs) -> Result<ExecutionResult, McpError> {
        let resource = args
            .resource
            .as_deref()
            .map(|name| parse_resource(catalog::CLEAR_CACHE, name))
            .transpose()?;

        self.engine.clear(resource);

        let text = match resource {
            Some(resource) => format!("Cleared {} cache", resource),
            None => "Cleared all caches".to_string(),
        };
        Ok(ExecutionResult::success_text(text))
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, McpError> {
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn parse_resource(tool: &str, name: &str) -> Result<ResourceType, McpError> {
    name.parse()
        .map_err(|e: ValidationError| McpError::validation(tool, e))
}

fn upstream_result(result: Result<Value, UpstreamError>) -> ExecutionResult {
    match result {
        Ok(value) => ExecutionResult::success_json(value),
        Err(e) => {
            tracing::warn!(error = %e, "Upstream request failed");
            ExecutionResult::error(format!("upstream request failed: {}", e))
        }
    }
}

fn retrieve_response(batch: &BatchResult) -> Value {
    let results: Vec<&Value> = batch.results.iter().map(|item| &item.value).collect();
    let provenance: Vec<Value> = batch
        .results
        .iter()
        .map(|item| {
            json!({
                "id": item.id,
                "source": item.provenance.source,
                "elapsed_ms": item.provenance.elapsed_ms,
            })
        })
        .collect();

    let mut response = json!({
        "resource": batch.resource,
        "results": results,
        "provenance": provenance,
        "summary": {
            "requested": batch.requested(),
            "successful": batch.successful(),
            "failed": batch.failed(),
        },
        "metrics": batch.metrics,
        "retrieved_at": Utc::now().to_rfc3339(),
    });
    if !batch.errors.is_empty() {
        response["errors"] = json!(batch.errors);
    }
    response
}
