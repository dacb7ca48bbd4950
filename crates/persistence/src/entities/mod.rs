//! Remote row definitions.
//!
//! Rows are direct mappings to the hosted store's tables (snake_case columns).

pub mod attendance;
pub mod class_room;
pub mod student;

pub use attendance::AttendanceRow;
pub use class_room::ClassRoomRow;
pub use student::StudentRow;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::record::Record;

/// A record type with a row mapping in the hosted store.
pub trait RemoteRecord: Record {
    type Row: DeserializeOwned + Into<Self> + Send;

    /// `order` query parameter used when listing the table.
    const ORDER: &'static str;

    /// Columns written on update.
    fn update_body(draft: &Self::Draft) -> Map<String, Value>;

    /// Columns written on insert: the update columns plus the owner tag.
    fn insert_body(draft: &Self::Draft, owner: Option<&str>) -> Value {
        let mut body = Self::update_body(draft);
        if let Some(owner) = owner {
            body.insert("user_id".to_string(), Value::String(owner.to_string()));
        }
        Value::Object(body)
    }
}
