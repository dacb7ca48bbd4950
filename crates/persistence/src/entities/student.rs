//! Student entity (remote row mapping).

use chrono::{DateTime, Utc};
use domain::models::{RecordId, Student, StudentDraft};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::RemoteRecord;

/// Row mapping for the students table.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRow {
    pub id: RecordId,
    pub name: String,
    /// Null once the referenced class is deleted with `ON DELETE SET NULL`.
    #[serde(default)]
    pub class_id: Option<RecordId>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            class_id: row.class_id.unwrap_or_else(|| RecordId::new("")),
        }
    }
}

impl RemoteRecord for Student {
    type Row = StudentRow;
    const ORDER: &'static str = "created_at.asc";

    fn update_body(draft: &StudentDraft) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("name".to_string(), Value::String(draft.name.clone()));
        body.insert(
            "class_id".to_string(),
            Value::String(draft.class_id.to_string()),
        );
        body
    }
}
