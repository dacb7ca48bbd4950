//! Attendance entity (remote row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{AttendanceDraft, AttendanceRecord, AttendanceStatus, RecordId};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::RemoteRecord;

/// Row mapping for the attendance table.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceRow {
    pub id: RecordId,
    pub date: NaiveDate,
    pub class_id: RecordId,
    pub student_id: RecordId,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            class_id: row.class_id,
            student_id: row.student_id,
            status: row.status,
        }
    }
}

impl RemoteRecord for AttendanceRecord {
    type Row = AttendanceRow;
    const ORDER: &'static str = "date.desc";

    fn update_body(draft: &AttendanceDraft) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("date".to_string(), Value::String(draft.date.to_string()));
        body.insert(
            "class_id".to_string(),
            Value::String(draft.class_id.to_string()),
        );
        body.insert(
            "student_id".to_string(),
            Value::String(draft.student_id.to_string()),
        );
        body.insert("status".to_string(), Value::String(draft.status.to_string()));
        body
    }
}

/// Body of a status-only update.
pub fn status_body(status: AttendanceStatus) -> Value {
    serde_json::json!({ "status": status })
}
