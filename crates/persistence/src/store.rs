//! The record store contract and backend selection.

use std::sync::Arc;

use async_trait::async_trait;
use domain::models::{
    AttendanceRecord, AttendanceSlot, AttendanceStatus, ClassRoom, RecordId, Student,
};
use tracing::info;

use crate::config::{BackendKind, StoreConfig};
use crate::error::StoreError;
use crate::local::LocalStore;
use crate::notify::ChangeSubscription;
use crate::record::Record;
use crate::remote::RemoteStore;

/// Storage operations for one record kind.
///
/// Drafts reaching a store have already been normalized and validated.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    fn backend(&self) -> BackendKind;

    /// All records, in the order `load` presents them.
    async fn list(&self) -> Result<Vec<T>, StoreError>;

    /// Stores a new record and returns it with its id.
    async fn insert(&self, draft: T::Draft) -> Result<T, StoreError>;

    /// Replaces all mutable fields of an existing record.
    async fn update(&self, id: &RecordId, draft: T::Draft) -> Result<T, StoreError>;

    /// Removes a record. Removing an unknown id is not an error.
    async fn delete(&self, id: &RecordId) -> Result<(), StoreError>;

    /// Push channel for backend changes, if the store has one.
    fn change_feed(&self) -> Option<ChangeSubscription> {
        None
    }
}

/// The attendance-specific queries behind the upsert-by-slot rule.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_slot(&self, slot: &AttendanceSlot)
        -> Result<Option<AttendanceRecord>, StoreError>;

    /// Updates only the status of an existing record.
    async fn set_status(
        &self,
        id: &RecordId,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError>;
}

/// One store per record kind, all served by the same backend.
#[derive(Clone)]
pub struct Stores {
    pub backend: BackendKind,
    pub classes: Arc<dyn RecordStore<ClassRoom>>,
    pub students: Arc<dyn RecordStore<Student>>,
    pub attendance: Arc<dyn RecordStore<AttendanceRecord>>,
    pub attendance_slots: Arc<dyn AttendanceStore>,
}

impl Stores {
    /// Selects the backend from configuration and opens it.
    ///
    /// This is the only place the remote/local decision is made; it is not
    /// revisited for the lifetime of the returned stores.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        match config.backend_kind() {
            BackendKind::Remote => {
                info!(
                    remote_url = %config.remote_url,
                    realtime = config.realtime,
                    "Using remote store"
                );
                Ok(RemoteStore::connect(config)?.into_stores())
            }
            BackendKind::Local => {
                info!(
                    local_dir = %config.local_dir.display(),
                    "Remote store not configured, using local store"
                );
                Ok(LocalStore::open(&config.local_dir).await?.into_stores())
            }
        }
    }
}
