//! Class room domain models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::record_id::RecordId;

/// A class that students belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRoom {
    pub id: RecordId,
    pub name: String,
}

impl ClassRoom {
    pub fn from_draft(id: RecordId, draft: ClassRoomDraft) -> Self {
        Self {
            id,
            name: draft.name,
        }
    }

    /// Returns the mutable fields of this class as a draft.
    pub fn draft(&self) -> ClassRoomDraft {
        ClassRoomDraft {
            name: self.name.clone(),
        }
    }
}

/// Mutable fields of a class, used for both creation and full-field update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassRoomDraft {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,
}

impl ClassRoomDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Trims surrounding whitespace from the name.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
        }
    }
}
