//! HTTP transport tests using `tower::ServiceExt::oneshot`.

use super::common::*;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use metabridge_mcp::create_router;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_mcp(payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_caches() {
    let app = create_router(Arc::new(server_with(FakeBi::new())));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tools"], 5);
    assert_eq!(body["caches"].as_array().unwrap().len(), 6);
    assert_eq!(body["caches"][0]["ttl_ms"], 600_000);
}

#[tokio::test]
async fn post_mcp_dispatches_requests() {
    let app = create_router(Arc::new(server_with(FakeBi::new())));

    let response = app
        .oneshot(post_mcp(json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": { "name": "retrieve", "arguments": { "resource": "card", "ids": [1] } }
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 7);
    assert_eq!(body["result"]["isError"], false);
}

#[tokio::test]
async fn post_mcp_notification_is_accepted() {
    let app = create_router(Arc::new(server_with(FakeBi::new())));

    let response = app
        .oneshot(post_mcp(json!({ "jsonrpc": "2.0", "method": "initialized" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn post_mcp_null_id_gets_a_reply() {
    let app = create_router(Arc::new(server_with(FakeBi::new())));

    let response = app
        .oneshot(post_mcp(json!({ "jsonrpc": "2.0", "id": null, "method": "shutdown" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["id"].is_null());
    assert!(body.get("error").is_none());
}
