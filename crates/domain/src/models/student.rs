//! Student domain models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::record_id::RecordId;

/// A student enrolled in a class.
///
/// `class_id` may point at a class that has since been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: RecordId,
    pub name: String,
    pub class_id: RecordId,
}

impl Student {
    pub fn from_draft(id: RecordId, draft: StudentDraft) -> Self {
        Self {
            id,
            name: draft.name,
            class_id: draft.class_id,
        }
    }

    pub fn draft(&self) -> StudentDraft {
        StudentDraft {
            name: self.name.clone(),
            class_id: self.class_id.clone(),
        }
    }
}

/// Mutable fields of a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "crate::models::record_id::validate_record_ref"))]
    pub class_id: RecordId,
}

impl StudentDraft {
    pub fn new(name: impl Into<String>, class_id: impl Into<RecordId>) -> Self {
        Self {
            name: name.into(),
            class_id: class_id.into(),
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            class_id: self.class_id,
        }
    }
}

/// Query parameters for listing students.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListStudentsQuery {
    pub class_id: Option<RecordId>,
}

/// A student row as rendered in the student list, with its class name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListing {
    pub id: RecordId,
    pub name: String,
    pub class_id: RecordId,
    pub class_name: String,
    /// True when `class_id` does not resolve to an existing class.
    pub class_missing: bool,
}
