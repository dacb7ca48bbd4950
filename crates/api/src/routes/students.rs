//! Student endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{ListStudentsQuery, RecordId, Student, StudentDraft, StudentListing};
use domain::services::roster;
use persistence::RecordKind;
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_created;

/// Response for student listing.
#[derive(Debug, Serialize)]
pub struct ListStudentsResponse {
    pub students: Vec<StudentListing>,
}

/// List students with their class names resolved.
///
/// GET /api/v1/students?class_id=<id>
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<ListStudentsQuery>,
) -> Json<ListStudentsResponse> {
    let classes = state.gateway.classes().records();
    let mut students = state.gateway.students().records();

    if let Some(class_id) = query.class_id.as_ref() {
        students.retain(|s| &s.class_id == class_id);
    }

    Json(ListStudentsResponse {
        students: roster::list_students(&students, &classes),
    })
}

/// Create a student.
///
/// POST /api/v1/students
pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<StudentDraft>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let student = state.gateway.students().add(request).await?;

    record_created(RecordKind::Student);
    info!(
        student_id = %student.id,
        class_id = %student.class_id,
        "Student created"
    );

    Ok((StatusCode::CREATED, Json(student)))
}

/// Rename a student or move them to another class.
///
/// PUT /api/v1/students/:id
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StudentDraft>,
) -> Result<Json<Student>, ApiError> {
    let id = RecordId::new(id);
    let student = state.gateway.students().update(&id, request).await?;

    info!(student_id = %student.id, class_id = %student.class_id, "Student updated");

    Ok(Json(student))
}

/// Delete a student. Their attendance history is kept.
///
/// DELETE /api/v1/students/:id
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = RecordId::new(id);
    state.gateway.students().delete(&id).await?;

    info!(student_id = %id, "Student deleted");

    Ok(StatusCode::NO_CONTENT)
}
