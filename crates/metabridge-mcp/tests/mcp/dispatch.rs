//! JSON-RPC dispatch tests.

use super::common::*;
use serde_json::json;

#[tokio::test]
async fn initialize_reports_server_info() {
    let server = server_with(FakeBi::new());
    let response = server.handle_request(request(1, "initialize", None)).await;

    let result = response.result.unwrap();
    assert_eq!(result["serverInfo"]["name"], "metabridge");
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert!(result["capabilities"]["tools"].is_object());
    assert_eq!(response.id, Some(json!(1)));
}

#[tokio::test]
async fn tools_list_returns_catalog_in_order() {
    let server = server_with(FakeBi::new());
    let response = server.handle_request(request(2, "tools/list", None)).await;

    let result = response.result.unwrap();
    let names: Vec<&str> = result["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["retrieve", "list", "search", "execute", "clear_cache"]);
    assert!(result["tools"][0]["inputSchema"]["properties"]["ids"].is_object());
    assert_eq!(result["tools"][0]["annotations"]["readOnlyHint"], true);
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let server = server_with(FakeBi::new());
    let response = server.handle_request(request(3, "resources/list", None)).await;
    assert_eq!(error_code(&response), -32601);
}

#[tokio::test]
async fn call_without_params_is_invalid() {
    let server = server_with(FakeBi::new());
    let response = server.handle_request(request(4, "tools/call", None)).await;
    assert_eq!(error_code(&response), -32602);
}

#[tokio::test]
async fn call_unknown_tool_is_invalid_params() {
    let server = server_with(FakeBi::new());
    let response = call_tool(&server, "drop_everything", json!({})).await;
    assert_eq!(error_code(&response), -32602);
    assert!(response.error.unwrap().message.contains("drop_everything"));
}

#[tokio::test]
async fn wrong_jsonrpc_version_is_rejected() {
    let server = server_with(FakeBi::new());
    let mut req = request(5, "initialize", None);
    req.jsonrpc = "1.0".to_string();
    let response = server.handle_request(req).await;
    assert_eq!(error_code(&response), -32600);
    let message = response.error.unwrap().message;
    assert_eq!(message, "invalid request: unsupported jsonrpc version: 1.0");
}

#[tokio::test]
async fn notifications_get_no_response() {
    let server = server_with(FakeBi::new());
    let response = server
        .handle_line(r#"{"jsonrpc":"2.0","method":"initialized"}"#)
        .await;
    assert!(response.is_none());
}

#[tokio::test]
async fn malformed_line_is_a_parse_error() {
    let server = server_with(FakeBi::new());
    let response = server.handle_line("{not json").await.unwrap();
    assert_eq!(error_code(&response), -32700);
    assert!(response.id.is_none());
}

#[tokio::test]
async fn line_with_id_is_dispatched() {
    let server = server_with(FakeBi::new());
    let response = server
        .handle_line(r#"{"jsonrpc":"2.0","id":"abc","method":"shutdown"}"#)
        .await
        .unwrap();
    assert_eq!(response.id, Some(json!("abc")));
    assert_eq!(response.result, Some(json!(null)));
}

#[tokio::test]
async fn null_id_is_a_request_not_a_notification() {
    let server = server_with(FakeBi::new());
    let response = server
        .handle_line(r#"{"jsonrpc":"2.0","id":null,"method":"tools/list"}"#)
        .await
        .unwrap();

    assert_eq!(response.id, Some(json!(null)));
    assert!(response.result.as_ref().unwrap()["tools"].is_array());
    let wire = serde_json::to_value(&response).unwrap();
    assert!(wire["id"].is_null());
}
