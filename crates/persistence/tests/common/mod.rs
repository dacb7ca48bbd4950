//! Common test utilities for persistence integration tests.
//!
//! Provides an in-process stand-in for the hosted store: a REST table
//! endpoint plus a server-sent change stream, served by axum on a random
//! local port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use persistence::StoreConfig;
use serde_json::{json, Value};
use tokio::sync::broadcast;

pub const TEST_KEY: &str = "test-key";

#[derive(Default)]
struct Db {
    tables: HashMap<String, Vec<Value>>,
    next_id: u64,
}

#[derive(Clone)]
struct FakeState {
    db: Arc<Mutex<Db>>,
    changes: broadcast::Sender<String>,
}

/// A running fake hosted store.
pub struct FakeRemote {
    pub url: String,
    state: FakeState,
}

impl FakeRemote {
    pub async fn start() -> Self {
        Self::serve(true).await
    }

    /// A store that serves tables but has no change-stream endpoint.
    pub async fn start_without_change_stream() -> Self {
        Self::serve(false).await
    }

    async fn serve(change_stream_route: bool) -> Self {
        let (changes, _) = broadcast::channel(64);
        let state = FakeState {
            db: Arc::new(Mutex::new(Db::default())),
            changes,
        };

        let mut app = Router::new().route(
            "/rest/v1/:table",
            get(select_rows)
                .post(insert_row)
                .patch(update_rows)
                .delete(delete_rows),
        );
        if change_stream_route {
            app = app.route("/realtime/v1/changes", get(change_stream));
        }
        let app = app.with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    /// Store configuration pointing at this server.
    pub fn config(&self, realtime: bool) -> StoreConfig {
        let mut config = StoreConfig::remote(&self.url, TEST_KEY);
        config.realtime = realtime;
        config
    }

    /// Inserts a row directly, as another client would, and announces it.
    pub fn seed(&self, table: &str, row: Value) -> Value {
        let row = self.state.db.lock().unwrap().insert(table, row);
        self.announce(table, "INSERT");
        row
    }

    /// Inserts a row without announcing it.
    pub fn seed_silently(&self, table: &str, row: Value) -> Value {
        self.state.db.lock().unwrap().insert(table, row)
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .db
            .lock()
            .unwrap()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn announce(&self, table: &str, change: &str) {
        let _ = self
            .state
            .changes
            .send(json!({ "table": table, "type": change }).to_string());
    }

    /// Waits until a realtime listener is connected.
    pub async fn wait_for_listener(&self) {
        for _ in 0..200 {
            if self.state.changes.receiver_count() > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("realtime listener never connected");
    }
}

impl Db {
    fn insert(&mut self, table: &str, mut row: Value) -> Value {
        self.next_id += 1;
        if let Some(obj) = row.as_object_mut() {
            obj.entry("id").or_insert(json!(self.next_id));
            obj.insert(
                "created_at".to_string(),
                json!(format!("2024-01-01T00:00:{:02}Z", self.next_id % 60)),
            );
        }
        self.tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        row
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let key = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    key == Some(TEST_KEY) && bearer == Some(TEST_KEY)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Invalid API key"})),
    )
        .into_response()
}

fn value_matches(value: Option<&Value>, expected: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == expected,
        _ => false,
    }
}

/// Row filter built from `column=eq.value` query parameters.
fn filters(params: &HashMap<String, String>) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(k, v)| v.strip_prefix("eq.").map(|v| (k.clone(), v.to_string())))
        .collect()
}

fn row_matches(row: &Value, filters: &[(String, String)]) -> bool {
    filters
        .iter()
        .all(|(column, expected)| value_matches(row.get(column), expected))
}

async fn select_rows(
    State(state): State<FakeState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let filters = filters(&params);
    let db = state.db.lock().unwrap();
    let mut rows: Vec<Value> = db
        .tables
        .get(&table)
        .map(|rows| {
            rows.iter()
                .filter(|row| row_matches(row, &filters))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    if params.get("order").map(String::as_str) == Some("date.desc") {
        rows.sort_by(|a, b| {
            let a = a.get("date").and_then(Value::as_str).unwrap_or_default();
            let b = b.get("date").and_then(Value::as_str).unwrap_or_default();
            b.cmp(a)
        });
    }
    if let Some(limit) = params.get("limit").and_then(|l| l.parse::<usize>().ok()) {
        rows.truncate(limit);
    }
    Json(rows).into_response()
}

async fn insert_row(
    State(state): State<FakeState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let row = state.db.lock().unwrap().insert(&table, body);
    let _ = state
        .changes
        .send(json!({"table": table, "type": "INSERT"}).to_string());
    (StatusCode::CREATED, Json(vec![row])).into_response()
}

async fn update_rows(
    State(state): State<FakeState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let filters = filters(&params);
    let mut updated = Vec::new();
    {
        let mut db = state.db.lock().unwrap();
        if let Some(rows) = db.tables.get_mut(&table) {
            for row in rows.iter_mut().filter(|row| row_matches(row, &filters)) {
                if let (Some(row_obj), Some(body_obj)) = (row.as_object_mut(), body.as_object()) {
                    for (k, v) in body_obj {
                        row_obj.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
    }
    if !updated.is_empty() {
        let _ = state
            .changes
            .send(json!({"table": table, "type": "UPDATE"}).to_string());
    }
    Json(updated).into_response()
}

async fn delete_rows(
    State(state): State<FakeState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let filters = filters(&params);
    let removed = {
        let mut db = state.db.lock().unwrap();
        match db.tables.get_mut(&table) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|row| !row_matches(row, &filters));
                before - rows.len()
            }
            None => 0,
        }
    };
    if removed > 0 {
        let _ = state
            .changes
            .send(json!({"table": table, "type": "DELETE"}).to_string());
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn change_stream(State(state): State<FakeState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let rx = state.changes.subscribe();
    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(data) => return Some((Ok::<Event, Infallible>(Event::default().data(data)), rx)),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(stream).into_response()
}
