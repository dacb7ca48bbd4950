//! Attendance report models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::attendance::AttendanceStatus;
use super::record_id::RecordId;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Single-day range.
    pub fn day(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// True when `from` is after `to`; such a range contains no day.
    pub fn is_inverted(&self) -> bool {
        self.from > self.to
    }
}

/// Per-status occurrence counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTally {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
}

impl StatusTally {
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.late
    }
}

/// Report row for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendanceSummary {
    pub student_id: RecordId,
    pub student_name: String,
    #[serde(flatten)]
    pub tally: StatusTally,
}

/// Query parameters for the attendance report.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceReportQuery {
    pub class_id: RecordId,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl AttendanceReportQuery {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.from, self.to)
    }
}

/// Attendance report for a class over a date range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub class_id: RecordId,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: Vec<StudentAttendanceSummary>,
}
