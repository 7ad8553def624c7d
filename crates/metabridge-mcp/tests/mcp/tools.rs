//! Tool behaviour through `tools/call`.

use super::common::*;
use metabridge_core::ResourceType;
use serde_json::json;

// =============================================================================
// RETRIEVE
// =============================================================================

#[tokio::test]
async fn retrieve_returns_results_in_request_order() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    let response = call_tool(
        &server,
        "retrieve",
        json!({ "resource": "card", "ids": [3, 1, 2] }),
    )
    .await;
    let body = tool_json(&response);

    let ids: Vec<u64> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert_eq!(body["resource"], "card");
    assert_eq!(body["summary"], json!({ "requested": 3, "successful": 3, "failed": 0 }));
    assert_eq!(body["metrics"]["api_calls"], 3);
    assert_eq!(body["metrics"]["primary_source"], "api");
    assert_eq!(body["provenance"][0]["source"], "api");
    assert!(body.get("errors").is_none());
    assert!(body["retrieved_at"].is_string());
    assert_eq!(bi.loads(), 3);
}

#[tokio::test]
async fn retrieve_reports_partial_failures() {
    let bi = FakeBi::new();
    bi.mark_missing(ResourceType::Dashboard, 2);
    let server = server_with(bi);

    let response = call_tool(
        &server,
        "retrieve",
        json!({ "resource": "dashboard", "ids": [1, 2, 3] }),
    )
    .await;
    let body = tool_json(&response);

    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["errors"][0]["id"], 2);
    assert!(body["errors"][0]["message"].as_str().unwrap().contains("404"));
    assert_eq!(body["summary"]["failed"], 1);
}

#[tokio::test]
async fn retrieve_all_failed_is_a_tool_error() {
    let bi = FakeBi::new();
    bi.set_down(true);
    let server = server_with(bi);

    let response = call_tool(
        &server,
        "retrieve",
        json!({ "resource": "table", "ids": [1, 2] }),
    )
    .await;
    let (is_error, text) = tool_output(&response);

    assert!(is_error);
    assert!(text.contains("failed to retrieve"), "{}", text);
    assert!(text.contains("connection refused"), "{}", text);
}

#[tokio::test]
async fn retrieve_rejects_too_many_ids_before_fetching() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    let ids: Vec<i64> = (1..=51).collect();
    let response = call_tool(&server, "retrieve", json!({ "resource": "card", "ids": ids })).await;

    assert_eq!(error_code(&response), -32602);
    assert!(response.error.unwrap().message.contains("50"));
    assert_eq!(bi.loads(), 0);
}

#[tokio::test]
async fn retrieve_rejects_bad_arguments() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    let cases = [
        json!({ "resource": "card", "ids": [] }),
        json!({ "resource": "card", "ids": [0, 1] }),
        json!({ "resource": "card", "ids": [-4] }),
        json!({ "resource": "widget", "ids": [1] }),
        json!({ "resource": "card" }),
        json!({ "resource": "card", "ids": ["1"] }),
        json!({ "resource": "card", "ids": [1], "extra": true }),
    ];
    for args in cases {
        let response = call_tool(&server, "retrieve", args.clone()).await;
        assert_eq!(error_code(&response), -32602, "args: {}", args);
    }
    assert_eq!(bi.loads(), 0);
}

#[tokio::test]
async fn question_is_an_alias_for_card() {
    let server = server_with(FakeBi::new());

    let response = call_tool(
        &server,
        "retrieve",
        json!({ "resource": "question", "ids": [9] }),
    )
    .await;
    let body = tool_json(&response);

    assert_eq!(body["resource"], "card");
    assert_eq!(body["results"][0]["model"], "card");
}

#[tokio::test]
async fn repeated_retrieve_is_served_from_cache() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());
    let args = json!({ "resource": "collection", "ids": [1, 2, 3] });

    tool_json(&call_tool(&server, "retrieve", args.clone()).await);
    let body = tool_json(&call_tool(&server, "retrieve", args).await);

    assert_eq!(bi.loads(), 3);
    assert_eq!(body["metrics"]["cache_hits"], 3);
    assert_eq!(body["metrics"]["api_calls"], 0);
    assert_eq!(body["metrics"]["primary_source"], "cache");
    assert_eq!(body["provenance"][2]["source"], "cache");
}

#[tokio::test]
async fn resource_names_are_case_insensitive() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    let response = call_tool(
        &server,
        "retrieve",
        json!({ "resource": "Dashboard", "ids": [1] }),
    )
    .await;
    let body = tool_json(&response);
    assert_eq!(body["resource"], "dashboard");
    assert_eq!(body["results"][0]["model"], "dashboard");

    let response = call_tool(&server, "list", json!({ "resource": "TABLE" })).await;
    assert_eq!(tool_json(&response)["data"][0]["model"], "table");

    let response = call_tool(&server, "clear_cache", json!({ "resource": "Dashboard" })).await;
    let (is_error, text) = tool_output(&response);
    assert!(!is_error);
    assert_eq!(text, "Cleared dashboard cache");
}

// =============================================================================
// CLEAR CACHE
// =============================================================================

#[tokio::test]
async fn clear_cache_forces_refetch() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());
    let args = json!({ "resource": "field", "ids": [5] });

    tool_json(&call_tool(&server, "retrieve", args.clone()).await);
    let cleared = call_tool(&server, "clear_cache", json!({ "resource": "field" })).await;
    let (is_error, text) = tool_output(&cleared);
    assert!(!is_error);
    assert_eq!(text, "Cleared field cache");

    tool_json(&call_tool(&server, "retrieve", args).await);
    assert_eq!(bi.loads(), 2);
}

#[tokio::test]
async fn clear_cache_without_resource_clears_everything() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    tool_json(&call_tool(&server, "retrieve", json!({ "resource": "card", "ids": [1] })).await);
    tool_json(&call_tool(&server, "retrieve", json!({ "resource": "database", "ids": [1] })).await);

    let (_, text) = tool_output(&call_tool(&server, "clear_cache", json!({})).await);
    assert_eq!(text, "Cleared all caches");
    assert!(server.cache_stats().iter().all(|s| s.entries == 0));
}

#[tokio::test]
async fn clear_cache_other_type_keeps_entries() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    tool_json(&call_tool(&server, "retrieve", json!({ "resource": "card", "ids": [1] })).await);
    tool_output(&call_tool(&server, "clear_cache", json!({ "resource": "dashboard" })).await);
    tool_json(&call_tool(&server, "retrieve", json!({ "resource": "card", "ids": [1] })).await);

    assert_eq!(bi.loads(), 1);
}

// =============================================================================
// LIST / SEARCH / EXECUTE
// =============================================================================

#[tokio::test]
async fn list_calls_upstream_every_time() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    let body = tool_json(&call_tool(&server, "list", json!({ "resource": "database" })).await);
    tool_json(&call_tool(&server, "list", json!({ "resource": "database" })).await);

    assert_eq!(body["data"][0]["model"], "database");
    assert_eq!(bi.calls(), vec!["list database", "list database"]);
}

#[tokio::test]
async fn list_rejects_fields() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    let response = call_tool(&server, "list", json!({ "resource": "field" })).await;
    assert_eq!(error_code(&response), -32602);
    assert!(bi.calls().is_empty());
}

#[tokio::test]
async fn upstream_failure_is_a_tool_error() {
    let bi = FakeBi::new();
    bi.set_down(true);
    let server = server_with(bi);

    let response = call_tool(&server, "list", json!({ "resource": "card" })).await;
    let (is_error, text) = tool_output(&response);
    assert!(is_error);
    assert!(text.starts_with("upstream request failed"), "{}", text);
}

#[tokio::test]
async fn search_passes_query_and_models() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    let response = call_tool(
        &server,
        "search",
        json!({ "query": "revenue", "models": ["card", "dashboard"] }),
    )
    .await;
    let body = tool_json(&response);

    assert_eq!(body["query"], "revenue");
    assert_eq!(body["models"], json!(["card", "dashboard"]));
    assert_eq!(bi.calls(), vec!["search revenue"]);
}

#[tokio::test]
async fn search_requires_query() {
    let server = server_with(FakeBi::new());
    let response = call_tool(&server, "search", json!({ "models": ["card"] })).await;
    assert_eq!(error_code(&response), -32602);
}

#[tokio::test]
async fn execute_runs_card_or_native_query() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    let card = tool_json(&call_tool(&server, "execute", json!({ "card_id": 4 })).await);
    assert_eq!(card["row_count"], 1);

    let response = call_tool(
        &server,
        "execute",
        json!({ "database_id": 2, "query": "SELECT 1" }),
    )
    .await;
    let native = tool_json(&response);
    assert_eq!(native["query"], "SELECT 1");

    assert_eq!(bi.calls(), vec!["execute_card 4", "execute_query 2"]);
}

#[tokio::test]
async fn execute_requires_one_target() {
    let bi = FakeBi::new();
    let server = server_with(bi.clone());

    let cases = [
        json!({}),
        json!({ "database_id": 2 }),
        json!({ "card_id": 1, "database_id": 2, "query": "SELECT 1" }),
        json!({ "card_id": 0 }),
    ];
    for args in cases {
        let response = call_tool(&server, "execute", args.clone()).await;
        assert_eq!(error_code(&response), -32602, "args: {}", args);
    }
    assert!(bi.calls().is_empty());
}
