//! The fixed set of tools the server exposes.

use crate::protocol::{ToolAnnotations, ToolDefinition};
use crate::tools::ToolRegistry;
use metabridge_core::ResourceType;
use serde_json::{Value, json};

pub const RETRIEVE: &str = "retrieve";
pub const LIST: &str = "list";
pub const SEARCH: &str = "search";
pub const EXECUTE: &str = "execute";
pub const CLEAR_CACHE: &str = "clear_cache";

/// Build the tool catalog. `max_ids` is advertised in the `retrieve`
/// description; the limit itself is enforced when the request is validated.
pub fn registry(max_ids: usize) -> ToolRegistry {
    [
        retrieve_tool(max_ids),
        list_tool(),
        search_tool(),
        execute_tool(),
        clear_cache_tool(),
    ]
    .into_iter()
    .collect()
}

/// Resource names are matched case-insensitively when the call runs, so the
/// schema only describes them instead of pinning an `enum`.
fn resource_property(filter: impl Fn(ResourceType) -> bool, alias: bool) -> Value {
    let mut names: Vec<&str> = ResourceType::ALL
        .into_iter()
        .filter(|r| filter(*r))
        .map(|r| r.as_str())
        .collect();
    if alias {
        names.push("question");
    }
    json!({
        "type": "string",
        "minLength": 1,
        "description": format!("Resource type, one of: {}", names.join(", "))
    })
}

fn read_only() -> Option<ToolAnnotations> {
    Some(ToolAnnotations {
        read_only: Some(true),
        idempotent: Some(true),
        open_world: Some(true),
    })
}

fn retrieve_tool(max_ids: usize) -> ToolDefinition {
    ToolDefinition {
        name: RETRIEVE.to_string(),
        description: Some(format!(
            "Fetch up to {max_ids} resources of one type by id. Results are cached per \
             resource type; ids that fail are reported individually alongside the ones \
             that succeed."
        )),
        input_schema: json!({
            "type": "object",
            "properties": {
                "resource": resource_property(|_| true, true),
                "ids": {
                    "type": "array",
                    "items": { "type": "integer" },
                    "description": "Resource ids, in the order results should be returned"
                }
            },
            "required": ["resource", "ids"],
            "additionalProperties": false
        }),
        annotations: read_only(),
    }
}

fn list_tool() -> ToolDefinition {
    ToolDefinition {
        name: LIST.to_string(),
        description: Some("List every resource of a type. Not cached.".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "resource": resource_property(|r| r.is_listable(), false)
            },
            "required": ["resource"],
            "additionalProperties": false
        }),
        annotations: read_only(),
    }
}

fn search_tool() -> ToolDefinition {
    ToolDefinition {
        name: SEARCH.to_string(),
        description: Some("Full-text search across the BI service.".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "minLength": 1 },
                "models": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Restrict results to these model types"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        }),
        annotations: read_only(),
    }
}

fn execute_tool() -> ToolDefinition {
    ToolDefinition {
        name: EXECUTE.to_string(),
        description: Some(
            "Run a saved question (card_id) or a native query against a database \
             (database_id + query)."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "card_id": { "type": "integer", "minimum": 1 },
                "database_id": { "type": "integer", "minimum": 1 },
                "query": { "type": "string", "minLength": 1 }
            },
            "additionalProperties": false
        }),
        annotations: Some(ToolAnnotations {
            read_only: Some(true),
            idempotent: Some(false),
            open_world: Some(true),
        }),
    }
}

fn clear_cache_tool() -> ToolDefinition {
    ToolDefinition {
        name: CLEAR_CACHE.to_string(),
        description: Some(
            "Drop cached entries for one resource type, or for every type when \
             resource is omitted."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "resource": resource_property(|_| true, true)
            },
            "additionalProperties": false
        }),
        annotations: Some(ToolAnnotations {
            read_only: Some(false),
            idempotent: Some(true),
            open_world: Some(false),
        }),
    }
}
