//! Class room entity (remote row mapping).

use chrono::{DateTime, Utc};
use domain::models::{ClassRoom, ClassRoomDraft, RecordId};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::RemoteRecord;

/// Row mapping for the classes table.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassRoomRow {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ClassRoomRow> for ClassRoom {
    fn from(row: ClassRoomRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

impl RemoteRecord for ClassRoom {
    type Row = ClassRoomRow;
    const ORDER: &'static str = "created_at.asc";

    fn update_body(draft: &ClassRoomDraft) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("name".to_string(), Value::String(draft.name.clone()));
        body
    }
}
