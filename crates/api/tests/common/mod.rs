//! Common test utilities for integration tests.
//!
//! Each test app runs over a local store rooted in its own temporary
//! directory, so tests never share state.

#![allow(dead_code)]

use attendance_api::{app::create_app, config::Config};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use fake::{faker::name::en::Name, Fake};
use persistence::{PersistenceGateway, StoreConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router over a freshly opened local store.
pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<PersistenceGateway>,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let (router, gateway) = open_app(&dir).await;
        Self {
            router,
            gateway,
            dir,
        }
    }

    /// Opens a second app over the same data directory, as after a restart.
    pub async fn reopen(&self) -> (Router, Arc<PersistenceGateway>) {
        open_app(&self.dir).await
    }

    pub async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Creates a class and returns its id.
    pub async fn create_class(&self, name: &str) -> String {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/classes",
                json!({ "name": name }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        id_of(&parse_response_body(response).await)
    }

    /// Creates a student in the given class and returns its id.
    pub async fn create_student(&self, name: &str, class_id: &str) -> String {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/students",
                json!({ "name": name, "classId": class_id }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        id_of(&parse_response_body(response).await)
    }

    /// Sets a status and returns the response body.
    pub async fn set_status(
        &self,
        date: &str,
        class_id: &str,
        student_id: &str,
        status: &str,
    ) -> Value {
        let response = self
            .send(json_request(
                Method::PUT,
                "/api/v1/attendance",
                json!({
                    "date": date,
                    "classId": class_id,
                    "studentId": student_id,
                    "status": status,
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        parse_response_body(response).await
    }
}

async fn open_app(dir: &TempDir) -> (Router, Arc<PersistenceGateway>) {
    let config = test_config(dir);
    let gateway = PersistenceGateway::open(&config.store)
        .await
        .expect("Failed to open local store");
    gateway.load_all().await;
    let gateway = Arc::new(gateway);
    (create_app(config, gateway.clone()), gateway)
}

/// Test configuration using a local store in `dir`.
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::with_store(StoreConfig::local(dir.path()));
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.logging.format = "pretty".to_string();
    config
}

/// A random student name.
pub fn student_name() -> String {
    Name().fake()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Parse response body as JSON.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

fn id_of(body: &Value) -> String {
    body["id"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| body["id"].to_string())
}
