//! Record kinds and the contract shared by every stored record type.

use domain::models::{
    AttendanceDraft, AttendanceRecord, ClassRoom, ClassRoomDraft, RecordId, Student, StudentDraft,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

/// The three record kinds, each persisted in its own table or slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Class,
    Student,
    Attendance,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Class, RecordKind::Student, RecordKind::Attendance];

    /// Remote table name.
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Class => "classes",
            RecordKind::Student => "students",
            RecordKind::Attendance => "attendance",
        }
    }

    /// Local slot file name.
    pub fn slot_file(&self) -> &'static str {
        match self {
            RecordKind::Class => "classes.json",
            RecordKind::Student => "students.json",
            RecordKind::Attendance => "attendance.json",
        }
    }

    pub fn from_table(table: &str) -> Option<Self> {
        RecordKind::ALL.into_iter().find(|k| k.table() == table)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Class => write!(f, "class"),
            RecordKind::Student => write!(f, "student"),
            RecordKind::Attendance => write!(f, "attendance"),
        }
    }
}

/// A record type that can be stored and presented as a collection.
pub trait Record:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// All fields except the id.
    type Draft: Validate + Clone + std::fmt::Debug + Send + Sync + 'static;

    const KIND: RecordKind;

    fn id(&self) -> &RecordId;

    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    /// Canonical form of a draft, applied before validation.
    fn normalize(draft: Self::Draft) -> Self::Draft;

    /// Full replace of the mutable fields; the id is kept.
    fn apply(&mut self, draft: Self::Draft) {
        let id = self.id().clone();
        *self = Self::from_draft(id, draft);
    }

    /// Orders a collection the way `load` presents it. Creation order by default.
    fn order(_records: &mut [Self]) {}
}

impl Record for ClassRoom {
    type Draft = ClassRoomDraft;
    const KIND: RecordKind = RecordKind::Class;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn from_draft(id: RecordId, draft: ClassRoomDraft) -> Self {
        ClassRoom::from_draft(id, draft)
    }

    fn normalize(draft: ClassRoomDraft) -> ClassRoomDraft {
        draft.normalized()
    }
}

impl Record for Student {
    type Draft = StudentDraft;
    const KIND: RecordKind = RecordKind::Student;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn from_draft(id: RecordId, draft: StudentDraft) -> Self {
        Student::from_draft(id, draft)
    }

    fn normalize(draft: StudentDraft) -> StudentDraft {
        draft.normalized()
    }
}

impl Record for AttendanceRecord {
    type Draft = AttendanceDraft;
    const KIND: RecordKind = RecordKind::Attendance;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn from_draft(id: RecordId, draft: AttendanceDraft) -> Self {
        AttendanceRecord::from_draft(id, draft)
    }

    fn normalize(draft: AttendanceDraft) -> AttendanceDraft {
        draft.normalized()
    }

    /// Newest day first; records of the same day keep creation order.
    fn order(records: &mut [Self]) {
        records.sort_by(|a, b| b.date.cmp(&a.date));
    }
}
