//! Explicit resync handler.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

/// Collection sizes after a resync.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub classes: usize,
    pub students: usize,
    pub attendance: usize,
}

/// Reload all three collections from the active backend.
///
/// POST /api/v1/refresh
pub async fn refresh_collections(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    state.gateway.refresh_all().await?;

    let response = RefreshResponse {
        classes: state.gateway.classes().records().len(),
        students: state.gateway.students().records().len(),
        attendance: state.gateway.attendance().records().len(),
    };
    info!(
        classes = response.classes,
        students = response.students,
        attendance = response.attendance,
        "Collections refreshed"
    );

    Ok(Json(response))
}
