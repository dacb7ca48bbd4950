//! Domain services for the attendance tracker.
//!
//! Services are pure functions over already-loaded collections.

pub mod attendance_sheet;
pub mod report;
pub mod roster;

pub use attendance_sheet::{attendance_sheet, find_attendance};
pub use report::summarize_attendance;
pub use roster::{class_label, list_students, students_in_class, NO_CLASS_LABEL};
