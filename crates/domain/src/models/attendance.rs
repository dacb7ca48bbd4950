//! Attendance domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::record_id::RecordId;

/// Attendance status of a student on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 3] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
    ];
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
            AttendanceStatus::Late => write!(f, "late"),
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            other => Err(format!("Unknown attendance status: {}", other)),
        }
    }
}

/// The (date, class, student) triple identifying one attendance entry.
///
/// At most one record exists per slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSlot {
    pub date: NaiveDate,
    pub class_id: RecordId,
    pub student_id: RecordId,
}

impl AttendanceSlot {
    pub fn new(
        date: NaiveDate,
        class_id: impl Into<RecordId>,
        student_id: impl Into<RecordId>,
    ) -> Self {
        Self {
            date,
            class_id: class_id.into(),
            student_id: student_id.into(),
        }
    }
}

/// A stored attendance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub date: NaiveDate,
    pub class_id: RecordId,
    pub student_id: RecordId,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn from_draft(id: RecordId, draft: AttendanceDraft) -> Self {
        Self {
            id,
            date: draft.date,
            class_id: draft.class_id,
            student_id: draft.student_id,
            status: draft.status,
        }
    }

    pub fn slot(&self) -> AttendanceSlot {
        AttendanceSlot {
            date: self.date,
            class_id: self.class_id.clone(),
            student_id: self.student_id.clone(),
        }
    }

    pub fn occupies(&self, slot: &AttendanceSlot) -> bool {
        self.date == slot.date && self.class_id == slot.class_id && self.student_id == slot.student_id
    }

    pub fn draft(&self) -> AttendanceDraft {
        AttendanceDraft {
            date: self.date,
            class_id: self.class_id.clone(),
            student_id: self.student_id.clone(),
            status: self.status,
        }
    }
}

/// All fields of an attendance entry except its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDraft {
    pub date: NaiveDate,
    #[validate(custom(function = "crate::models::record_id::validate_record_ref"))]
    pub class_id: RecordId,
    #[validate(custom(function = "crate::models::record_id::validate_record_ref"))]
    pub student_id: RecordId,
    pub status: AttendanceStatus,
}

impl AttendanceDraft {
    pub fn new(slot: AttendanceSlot, status: AttendanceStatus) -> Self {
        Self {
            date: slot.date,
            class_id: slot.class_id,
            student_id: slot.student_id,
            status,
        }
    }

    pub fn slot(&self) -> AttendanceSlot {
        AttendanceSlot {
            date: self.date,
            class_id: self.class_id.clone(),
            student_id: self.student_id.clone(),
        }
    }

    pub fn normalized(self) -> Self {
        self
    }
}

/// Request to set a student's status for a day.
pub type SetAttendanceStatusRequest = AttendanceDraft;

/// Query parameters for the daily attendance sheet.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceSheetQuery {
    pub date: NaiveDate,
    pub class_id: RecordId,
}

/// One row of the daily attendance sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheetRow {
    pub student_id: RecordId,
    pub student_name: String,
    /// Recorded status, or the default status when nothing is recorded yet.
    pub status: AttendanceStatus,
    pub recorded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_status_display_and_parse() {
        for status in AttendanceStatus::ALL {
            let parsed: AttendanceStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("excused".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&AttendanceStatus::Late).unwrap();
        assert_eq!(json, r#""late""#);
        let parsed: AttendanceStatus = serde_json::from_str(r#""absent""#).unwrap();
        assert_eq!(parsed, AttendanceStatus::Absent);
    }

    #[test]
    fn test_record_json_shape() {
        let record = AttendanceRecord {
            id: RecordId::new("a1"),
            date: day("2024-01-10"),
            class_id: RecordId::new("c1"),
            student_id: RecordId::new("s1"),
            status: AttendanceStatus::Present,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "a1",
                "date": "2024-01-10",
                "classId": "c1",
                "studentId": "s1",
                "status": "present"
            })
        );
    }

    #[test]
    fn test_occupies_matches_full_triple() {
        let record = AttendanceRecord::from_draft(
            RecordId::new("a1"),
            AttendanceDraft::new(
                AttendanceSlot::new(day("2024-01-10"), "c1", "s1"),
                AttendanceStatus::Late,
            ),
        );
        assert!(record.occupies(&AttendanceSlot::new(day("2024-01-10"), "c1", "s1")));
        assert!(!record.occupies(&AttendanceSlot::new(day("2024-01-11"), "c1", "s1")));
        assert!(!record.occupies(&AttendanceSlot::new(day("2024-01-10"), "c2", "s1")));
        assert!(!record.occupies(&AttendanceSlot::new(day("2024-01-10"), "c1", "s2")));
    }

    #[test]
    fn test_draft_requires_class_and_student() {
        let draft = AttendanceDraft::new(
            AttendanceSlot::new(day("2024-01-10"), "", "s1"),
            AttendanceStatus::Present,
        );
        let errors = draft.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("class_id"));

        let draft = AttendanceDraft::new(
            AttendanceSlot::new(day("2024-01-10"), "c1", ""),
            AttendanceStatus::Present,
        );
        let errors = draft.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("student_id"));
    }

    #[test]
    fn test_set_status_request_deserialize() {
        let json = r#"{"date":"2024-01-10","classId":"c1","studentId":"s1","status":"late"}"#;
        let req: SetAttendanceStatusRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.slot(), AttendanceSlot::new(day("2024-01-10"), "c1", "s1"));
        assert_eq!(req.status, AttendanceStatus::Late);
    }
}
