//! Health check endpoint handlers.

use axum::{extract::State, Json};
use persistence::{BackendKind, CollectionGateway, Record};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: BackendKind,
    pub collections: CollectionsHealth,
}

/// Per-collection state.
#[derive(Debug, Serialize)]
pub struct CollectionsHealth {
    pub classes: CollectionHealth,
    pub students: CollectionHealth,
    pub attendance: CollectionHealth,
}

#[derive(Debug, Serialize)]
pub struct CollectionHealth {
    pub count: usize,
    pub loading: bool,
    /// True while a change subscription keeps the collection in sync.
    pub live: bool,
}

impl CollectionHealth {
    fn of<T: Record>(collection: &CollectionGateway<T>) -> Self {
        let snapshot = collection.snapshot();
        Self {
            count: snapshot.records.len(),
            loading: snapshot.loading,
            live: collection.is_live(),
        }
    }
}

/// Simple status response for liveness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Reports the backend selected at startup and the state of each collection.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let gateway = &state.gateway;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: gateway.backend(),
        collections: CollectionsHealth {
            classes: CollectionHealth::of(gateway.classes()),
            students: CollectionHealth::of(gateway.students()),
            attendance: CollectionHealth::of(gateway.attendance().collection()),
        },
    })
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serializes_backend() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            backend: BackendKind::Local,
            collections: CollectionsHealth {
                classes: CollectionHealth {
                    count: 2,
                    loading: false,
                    live: false,
                },
                students: CollectionHealth {
                    count: 0,
                    loading: true,
                    live: false,
                },
                attendance: CollectionHealth {
                    count: 0,
                    loading: false,
                    live: false,
                },
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["backend"], "local");
        assert_eq!(json["collections"]["classes"]["count"], 2);
        assert_eq!(json["collections"]["students"]["loading"], true);
    }

    #[tokio::test]
    async fn test_live() {
        let Json(response) = live().await;
        assert_eq!(response.status, "alive");
    }
}
