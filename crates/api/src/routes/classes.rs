//! Class endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{ClassRoom, ClassRoomDraft, RecordId};
use persistence::RecordKind;
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_created;

/// Response for class listing.
#[derive(Debug, Serialize)]
pub struct ListClassesResponse {
    pub classes: Vec<ClassRoom>,
}

/// List all classes in creation order.
///
/// GET /api/v1/classes
pub async fn list_classes(State(state): State<AppState>) -> Json<ListClassesResponse> {
    Json(ListClassesResponse {
        classes: state.gateway.classes().records(),
    })
}

/// Create a class.
///
/// POST /api/v1/classes
pub async fn create_class(
    State(state): State<AppState>,
    Json(request): Json<ClassRoomDraft>,
) -> Result<(StatusCode, Json<ClassRoom>), ApiError> {
    let class = state.gateway.classes().add(request).await?;

    record_created(RecordKind::Class);
    info!(class_id = %class.id, class_name = %class.name, "Class created");

    Ok((StatusCode::CREATED, Json(class)))
}

/// Rename a class.
///
/// PUT /api/v1/classes/:id
pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ClassRoomDraft>,
) -> Result<Json<ClassRoom>, ApiError> {
    let id = RecordId::new(id);
    let class = state.gateway.classes().update(&id, request).await?;

    info!(class_id = %class.id, class_name = %class.name, "Class updated");

    Ok(Json(class))
}

/// Delete a class. Students that reference it are left in place.
///
/// DELETE /api/v1/classes/:id
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = RecordId::new(id);
    state.gateway.classes().delete(&id).await?;

    info!(class_id = %id, "Class deleted");

    Ok(StatusCode::NO_CONTENT)
}
