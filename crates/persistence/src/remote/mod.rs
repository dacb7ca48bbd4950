//! Hosted remote store.
//!
//! Every record kind maps to a table behind the store's REST endpoint. When
//! realtime is enabled, a single [`RealtimeListener`] feeds change events to
//! all tables through a shared [`ChangeNotifier`].

pub mod client;
pub mod realtime;

pub use client::RemoteClient;
pub use realtime::{RealtimeListener, SseParser};

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use domain::models::{
    AttendanceRecord, AttendanceSlot, AttendanceStatus, ClassRoom, RecordId, Student,
};

use crate::config::{BackendKind, StoreConfig};
use crate::entities::attendance::status_body;
use crate::entities::{AttendanceRow, RemoteRecord};
use crate::error::StoreError;
use crate::metrics::QueryTimer;
use crate::notify::{ChangeNotifier, ChangeSubscription};
use crate::record::Record;
use crate::store::{AttendanceStore, RecordStore, Stores};

/// One remote table.
pub struct RemoteTable<T> {
    client: Arc<RemoteClient>,
    notifier: Option<ChangeNotifier>,
    /// Keeps the shared listener alive while any table is in use.
    _listener: Option<Arc<RealtimeListener>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> RemoteTable<T> {
    fn new(
        client: Arc<RemoteClient>,
        notifier: Option<ChangeNotifier>,
        listener: Option<Arc<RealtimeListener>>,
    ) -> Self {
        Self {
            client,
            notifier,
            _listener: listener,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T: RemoteRecord> RecordStore<T> for RemoteTable<T> {
    fn backend(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        let timer = QueryTimer::new(BackendKind::Remote, T::KIND, "list");
        let result = self
            .client
            .select::<T::Row>(T::KIND, &[("order", T::ORDER.to_string())])
            .await
            .map(|rows| rows.into_iter().map(Into::into).collect());
        timer.finish(result)
    }

    async fn insert(&self, draft: T::Draft) -> Result<T, StoreError> {
        let timer = QueryTimer::new(BackendKind::Remote, T::KIND, "insert");
        let body = T::insert_body(&draft, self.client.owner());
        let result = self
            .client
            .insert::<T::Row>(T::KIND, &body)
            .await
            .map(Into::into);
        timer.finish(result)
    }

    async fn update(&self, id: &RecordId, draft: T::Draft) -> Result<T, StoreError> {
        let timer = QueryTimer::new(BackendKind::Remote, T::KIND, "update");
        let body = serde_json::Value::Object(T::update_body(&draft));
        let result = match self.client.update::<T::Row>(T::KIND, id, &body).await {
            Ok(Some(row)) => Ok(row.into()),
            Ok(None) => Err(StoreError::not_found(T::KIND, id)),
            Err(e) => Err(e),
        };
        timer.finish(result)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let timer = QueryTimer::new(BackendKind::Remote, T::KIND, "delete");
        let result = self.client.delete(T::KIND, id).await;
        timer.finish(result)
    }

    fn change_feed(&self) -> Option<ChangeSubscription> {
        self.notifier
            .as_ref()
            .filter(|notifier| !notifier.is_closed())
            .map(|notifier| notifier.subscribe(T::KIND))
    }
}

#[async_trait]
impl AttendanceStore for RemoteTable<AttendanceRecord> {
    async fn find_slot(
        &self,
        slot: &AttendanceSlot,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let timer = QueryTimer::new(BackendKind::Remote, AttendanceRecord::KIND, "find_slot");
        let query = [
            ("date", client::eq(&slot.date.to_string())),
            ("class_id", client::eq(slot.class_id.as_str())),
            ("student_id", client::eq(slot.student_id.as_str())),
            ("limit", "1".to_string()),
        ];
        let result = self
            .client
            .select::<AttendanceRow>(AttendanceRecord::KIND, &query)
            .await
            .map(|rows| rows.into_iter().next().map(Into::into));
        timer.finish(result)
    }

    async fn set_status(
        &self,
        id: &RecordId,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        let timer = QueryTimer::new(BackendKind::Remote, AttendanceRecord::KIND, "set_status");
        let result = match self
            .client
            .update::<AttendanceRow>(AttendanceRecord::KIND, id, &status_body(status))
            .await
        {
            Ok(Some(row)) => Ok(row.into()),
            Ok(None) => Err(StoreError::not_found(AttendanceRecord::KIND, id)),
            Err(e) => Err(e),
        };
        timer.finish(result)
    }
}

/// The remote backend: one table per record kind, sharing a client and,
/// when realtime is enabled, a change listener.
pub struct RemoteStore {
    client: Arc<RemoteClient>,
    notifier: Option<ChangeNotifier>,
    listener: Option<Arc<RealtimeListener>>,
}

impl RemoteStore {
    /// Builds the client and, if configured, starts the realtime listener.
    ///
    /// Must be called within a Tokio runtime when realtime is enabled.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Arc::new(RemoteClient::new(config)?);

        let (notifier, listener) = if config.realtime {
            let notifier = ChangeNotifier::new();
            let listener = RealtimeListener::spawn(client.clone(), notifier.clone());
            (Some(notifier), Some(Arc::new(listener)))
        } else {
            (None, None)
        };

        Ok(Self {
            client,
            notifier,
            listener,
        })
    }

    pub fn client(&self) -> &RemoteClient {
        &self.client
    }

    fn table<T>(&self) -> RemoteTable<T> {
        RemoteTable::new(
            self.client.clone(),
            self.notifier.clone(),
            self.listener.clone(),
        )
    }

    pub fn into_stores(self) -> Stores {
        let attendance = Arc::new(self.table::<AttendanceRecord>());
        Stores {
            backend: BackendKind::Remote,
            classes: Arc::new(self.table::<ClassRoom>()),
            students: Arc::new(self.table::<Student>()),
            attendance: attendance.clone(),
            attendance_slots: attendance,
        }
    }
}
