//! Store operation metrics.
//!
//! Provides functions for recording store-related metrics.

use metrics::{counter, histogram};
use std::time::Instant;

use crate::config::BackendKind;
use crate::record::RecordKind;

/// Record the duration of a store operation.
pub fn record_operation_duration(
    backend: BackendKind,
    kind: RecordKind,
    operation: &'static str,
    duration_secs: f64,
) {
    histogram!(
        "store_operation_duration_seconds",
        "backend" => backend.to_string(),
        "table" => kind.table(),
        "operation" => operation
    )
    .record(duration_secs);
}

/// Count a failed store operation.
pub fn record_operation_failure(backend: BackendKind, kind: RecordKind, operation: &'static str) {
    counter!(
        "store_operation_failures_total",
        "backend" => backend.to_string(),
        "table" => kind.table(),
        "operation" => operation
    )
    .increment(1);
}

/// Count a change notification received from the remote feed.
pub fn record_change_notification(kind: RecordKind) {
    counter!("store_change_notifications_total", "table" => kind.table()).increment(1);
}

/// A helper to time store operations and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new(BackendKind::Remote, RecordKind::Class, "list");
/// let result = client.select(...).await;
/// timer.finish(&result)
/// ```
pub struct QueryTimer {
    backend: BackendKind,
    kind: RecordKind,
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    /// Create a new timer for the given operation.
    pub fn new(backend: BackendKind, kind: RecordKind, operation: &'static str) -> Self {
        Self {
            backend,
            kind,
            operation,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_operation_duration(self.backend, self.kind, self.operation, duration);
    }

    /// Record the duration, and a failure when `result` is an error; passes the result through.
    pub fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E> {
        if result.is_err() {
            record_operation_failure(self.backend, self.kind, self.operation);
        }
        self.record();
        result
    }
}
