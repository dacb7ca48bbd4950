//! Attendance collection with the upsert-by-slot rule.

use std::ops::Deref;
use std::sync::Arc;

use domain::models::{AttendanceDraft, AttendanceRecord, AttendanceSlot, AttendanceStatus};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error};
use validator::Validate;

use super::collection::CollectionGateway;
use crate::error::StoreError;
use crate::record::Record;
use crate::store::{AttendanceStore, RecordStore};

/// Whether a status write created a record or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// The attendance collection.
///
/// Derefs to the underlying [`CollectionGateway`] for load and plain CRUD.
pub struct AttendanceGateway {
    records: CollectionGateway<AttendanceRecord>,
    slots: Arc<dyn AttendanceStore>,
    /// Serializes lookup-then-write so concurrent writes for one slot cannot
    /// both insert.
    upsert_lock: Mutex<()>,
}

impl AttendanceGateway {
    pub fn new(
        store: Arc<dyn RecordStore<AttendanceRecord>>,
        slots: Arc<dyn AttendanceStore>,
    ) -> Self {
        Self {
            records: CollectionGateway::new(store),
            slots,
            upsert_lock: Mutex::new(()),
        }
    }

    pub fn collection(&self) -> &CollectionGateway<AttendanceRecord> {
        &self.records
    }

    pub fn collection_mut(&mut self) -> &mut CollectionGateway<AttendanceRecord> {
        &mut self.records
    }

    /// Sets a student's status for a day.
    ///
    /// If a record already exists for the draft's slot only its status is
    /// updated; otherwise a new record is inserted.
    pub async fn set_status(
        &self,
        draft: AttendanceDraft,
    ) -> Result<(AttendanceRecord, UpsertOutcome), StoreError> {
        let draft = AttendanceRecord::normalize(draft);
        draft.validate()?;
        let slot = draft.slot();

        let _guard = self.upsert_lock.lock().await;

        let existing = self.slots.find_slot(&slot).await.map_err(|e| {
            error!(date = %slot.date, class_id = %slot.class_id, student_id = %slot.student_id, error = %e, "Attendance lookup failed");
            e
        })?;

        match existing {
            Some(existing) => {
                let record = self
                    .slots
                    .set_status(&existing.id, draft.status)
                    .await
                    .map_err(|e| {
                        error!(id = %existing.id, error = %e, "Failed to update attendance status");
                        e
                    })?;
                self.records.replace_local(record.clone());
                debug!(id = %record.id, status = %record.status, "Attendance status updated");
                Ok((record, UpsertOutcome::Updated))
            }
            None => {
                let record = self.records.add(draft).await?;
                Ok((record, UpsertOutcome::Inserted))
            }
        }
    }

    /// Recorded status for a slot in the loaded collection.
    pub fn status_for(&self, slot: &AttendanceSlot) -> Option<AttendanceStatus> {
        self.records
            .records()
            .iter()
            .find(|r| r.occupies(slot))
            .map(|r| r.status)
    }
}

impl Deref for AttendanceGateway {
    type Target = CollectionGateway<AttendanceRecord>;

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
