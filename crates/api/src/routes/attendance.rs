//! Attendance endpoint handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use domain::models::{
    AttendanceRecord, AttendanceSheetQuery, AttendanceSheetRow, RecordId,
    SetAttendanceStatusRequest,
};
use domain::services::attendance_sheet;
use persistence::UpsertOutcome;
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_attendance_write;

/// Attendance sheet for one class on one day.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheetResponse {
    pub date: NaiveDate,
    pub class_id: RecordId,
    pub rows: Vec<AttendanceSheetRow>,
}

/// Result of a status write.
#[derive(Debug, Serialize)]
pub struct SetAttendanceStatusResponse {
    pub record: AttendanceRecord,
    pub outcome: UpsertOutcome,
}

/// Get the attendance sheet for a class and day.
///
/// Every student of the class appears once; students without a recorded
/// status show the default status with `recorded = false`.
///
/// GET /api/v1/attendance?date=<YYYY-MM-DD>&class_id=<id>
pub async fn get_attendance_sheet(
    State(state): State<AppState>,
    Query(query): Query<AttendanceSheetQuery>,
) -> Json<AttendanceSheetResponse> {
    let students = state.gateway.students().records();
    let records = state.gateway.attendance().records();

    let rows = attendance_sheet(query.date, &query.class_id, &students, &records);

    Json(AttendanceSheetResponse {
        date: query.date,
        class_id: query.class_id,
        rows,
    })
}

/// Set a student's status for a day, updating the existing record for the
/// (date, class, student) triple when there is one.
///
/// PUT /api/v1/attendance
pub async fn set_attendance_status(
    State(state): State<AppState>,
    Json(request): Json<SetAttendanceStatusRequest>,
) -> Result<Json<SetAttendanceStatusResponse>, ApiError> {
    let (record, outcome) = state.gateway.attendance().set_status(request).await?;

    record_attendance_write(outcome);
    info!(
        attendance_id = %record.id,
        student_id = %record.student_id,
        date = %record.date,
        status = %record.status,
        ?outcome,
        "Attendance status set"
    );

    Ok(Json(SetAttendanceStatusResponse { record, outcome }))
}
