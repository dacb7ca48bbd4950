//! Domain layer for the attendance tracker.
//!
//! This crate contains:
//! - Domain models (ClassRoom, Student, AttendanceRecord) and their drafts
//! - Pure services over loaded collections (roster rendering, attendance
//!   sheets, report aggregation)

pub mod models;
pub mod services;
