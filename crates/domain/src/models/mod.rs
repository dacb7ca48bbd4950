//! Domain models for the attendance tracker.

pub mod attendance;
pub mod class_room;
pub mod record_id;
pub mod report;
pub mod student;

pub use attendance::{
    AttendanceDraft, AttendanceRecord, AttendanceSheetQuery, AttendanceSheetRow, AttendanceSlot,
    AttendanceStatus, SetAttendanceStatusRequest,
};
pub use class_room::{ClassRoom, ClassRoomDraft};
pub use record_id::RecordId;
pub use report::{
    AttendanceReport, AttendanceReportQuery, DateRange, StatusTally, StudentAttendanceSummary,
};
pub use student::{ListStudentsQuery, Student, StudentDraft, StudentListing};
