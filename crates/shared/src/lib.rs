//! Shared utilities and common types for the attendance tracker.
//!
//! This crate provides common functionality used across all other crates:
//! - Client-side record id generation
//! - Common validation logic

pub mod id;
pub mod validation;
