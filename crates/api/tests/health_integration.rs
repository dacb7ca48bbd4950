//! Integration tests for health and metrics endpoints.
//!
//! Run with: cargo test --test health_integration

mod common;

use axum::http::StatusCode;
use common::{get_request, parse_response_body, TestApp};

#[tokio::test]
async fn test_health_reports_local_backend() {
    let app = TestApp::new().await;
    app.create_class("5A").await;

    let response = app.send(get_request("/api/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "local");
    assert_eq!(body["collections"]["classes"]["count"], 1);
    assert_eq!(body["collections"]["classes"]["loading"], false);
    assert_eq!(body["collections"]["classes"]["live"], false);
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;

    let response = app.send(get_request("/api/health/live")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = TestApp::new().await;

    let request = axum::http::Request::builder()
        .uri("/api/health/live")
        .header("X-Request-ID", "req-42")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-42"
    );
}

#[tokio::test]
async fn test_unknown_route_not_found() {
    let app = TestApp::new().await;

    let response = app.send(get_request("/api/v1/teachers")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
