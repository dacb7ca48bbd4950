//! Attendance report handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{AttendanceReport, AttendanceReportQuery};
use domain::services::summarize_attendance;

use crate::app::AppState;
use crate::error::ApiError;

/// Per-student status tallies for a class over an inclusive date range.
///
/// GET /api/v1/reports/attendance?class_id=<id>&from=<date>&to=<date>
pub async fn get_attendance_report(
    State(state): State<AppState>,
    Query(query): Query<AttendanceReportQuery>,
) -> Result<Json<AttendanceReport>, ApiError> {
    let range = query.range();
    if range.is_inverted() {
        return Err(ApiError::Validation(
            "Report start date must not be after its end date".to_string(),
        ));
    }

    let students = state.gateway.students().records();
    let records = state.gateway.attendance().records();
    let rows = summarize_attendance(&query.class_id, range, &students, &records);

    Ok(Json(AttendanceReport {
        class_id: query.class_id,
        from: query.from,
        to: query.to,
        rows,
    }))
}
