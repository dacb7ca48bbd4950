//! Daily attendance sheet for a class.

use chrono::NaiveDate;

use crate::models::{AttendanceRecord, AttendanceSheetRow, AttendanceSlot, RecordId, Student};
use crate::services::roster::students_in_class;

/// Finds the record occupying the given slot, if any.
pub fn find_attendance<'a>(
    attendance: &'a [AttendanceRecord],
    slot: &AttendanceSlot,
) -> Option<&'a AttendanceRecord> {
    attendance.iter().find(|a| a.occupies(slot))
}

/// One row per student of the class, with the status recorded for `date`.
///
/// Students with nothing recorded show the default status and `recorded: false`.
pub fn attendance_sheet(
    date: NaiveDate,
    class_id: &RecordId,
    students: &[Student],
    attendance: &[AttendanceRecord],
) -> Vec<AttendanceSheetRow> {
    students_in_class(students, class_id)
        .into_iter()
        .map(|s| {
            let slot = AttendanceSlot::new(date, class_id.clone(), s.id.clone());
            let recorded = find_attendance(attendance, &slot);
            AttendanceSheetRow {
                student_id: s.id.clone(),
                student_name: s.name.clone(),
                status: recorded.map(|r| r.status).unwrap_or_default(),
                recorded: recorded.is_some(),
            }
        })
        .collect()
}
