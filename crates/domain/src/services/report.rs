//! Attendance report aggregation.

use std::collections::HashMap;

use crate::models::{
    AttendanceRecord, DateRange, RecordId, StatusTally, Student, StudentAttendanceSummary,
};
use crate::services::roster::students_in_class;

/// Counts each status per student of `class_id` within the inclusive `range`.
///
/// Rows follow the student collection order and include students with no
/// records in range (all counts zero). Records of students no longer in the
/// class are not reported.
pub fn summarize_attendance(
    class_id: &RecordId,
    range: DateRange,
    students: &[Student],
    attendance: &[AttendanceRecord],
) -> Vec<StudentAttendanceSummary> {
    let mut tallies: HashMap<&RecordId, StatusTally> = HashMap::new();
    for record in attendance
        .iter()
        .filter(|a| &a.class_id == class_id && range.contains(a.date))
    {
        tallies
            .entry(&record.student_id)
            .or_default()
            .record(record.status);
    }

    students_in_class(students, class_id)
        .into_iter()
        .map(|s| StudentAttendanceSummary {
            student_id: s.id.clone(),
            student_name: s.name.clone(),
            tally: tallies.get(&s.id).copied().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;
    use chrono::NaiveDate;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn student(id: &str, name: &str, class_id: &str) -> Student {
        Student {
            id: RecordId::new(id),
            name: name.to_string(),
            class_id: RecordId::new(class_id),
        }
    }

    fn record(
        id: &str,
        date: &str,
        class_id: &str,
        student_id: &str,
        status: AttendanceStatus,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id: RecordId::new(id),
            date: day(date),
            class_id: RecordId::new(class_id),
            student_id: RecordId::new(student_id),
            status,
        }
    }

    #[test]
    fn test_week_report_counts() {
        let students = vec![student("s1", "Ali", "c1")];
        let attendance = vec![
            record("a1", "2024-01-08", "c1", "s1", AttendanceStatus::Present),
            record("a2", "2024-01-09", "c1", "s1", AttendanceStatus::Absent),
            record("a3", "2024-01-12", "c1", "s1", AttendanceStatus::Present),
        ];
        let range = DateRange::new(day("2024-01-08"), day("2024-01-14"));

        let rows = summarize_attendance(&RecordId::new("c1"), range, &students, &attendance);

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].tally,
            StatusTally {
                present: 2,
                absent: 1,
                late: 0
            }
        );
    }

    #[test]
    fn test_report_excludes_out_of_range_and_other_classes() {
        let students = vec![student("s1", "Ali", "c1")];
        let attendance = vec![
            record("a1", "2024-01-07", "c1", "s1", AttendanceStatus::Late),
            record("a2", "2024-01-15", "c1", "s1", AttendanceStatus::Late),
            record("a3", "2024-01-10", "c2", "s1", AttendanceStatus::Late),
            record("a4", "2024-01-10", "c1", "s1", AttendanceStatus::Late),
        ];
        let range = DateRange::new(day("2024-01-08"), day("2024-01-14"));

        let rows = summarize_attendance(&RecordId::new("c1"), range, &students, &attendance);

        assert_eq!(rows[0].tally.late, 1);
        assert_eq!(rows[0].tally.total(), 1);
    }

    #[test]
    fn test_report_includes_students_without_records() {
        let students = vec![
            student("s1", "Ali", "c1"),
            student("s2", "Ayse", "c1"),
            student("s3", "Can", "c2"),
        ];
        let attendance = vec![record(
            "a1",
            "2024-01-10",
            "c1",
            "s1",
            AttendanceStatus::Present,
        )];
        let range = DateRange::day(day("2024-01-10"));

        let rows = summarize_attendance(&RecordId::new("c1"), range, &students, &attendance);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].student_name, "Ali");
        assert_eq!(rows[0].tally.present, 1);
        assert_eq!(rows[1].student_name, "Ayse");
        assert_eq!(rows[1].tally, StatusTally::default());
    }

    #[test]
    fn test_inverted_range_yields_zero_counts() {
        let students = vec![student("s1", "Ali", "c1")];
        let attendance = vec![record(
            "a1",
            "2024-01-10",
            "c1",
            "s1",
            AttendanceStatus::Absent,
        )];
        let range = DateRange::new(day("2024-01-14"), day("2024-01-08"));

        let rows = summarize_attendance(&RecordId::new("c1"), range, &students, &attendance);

        assert_eq!(rows[0].tally.total(), 0);
    }
}
