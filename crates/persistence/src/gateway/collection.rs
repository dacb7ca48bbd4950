//! Reactive collection over one record store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use domain::models::RecordId;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::config::BackendKind;
use crate::error::StoreError;
use crate::notify::{ChangeSignal, ChangeSubscription};
use crate::record::{Record, RecordKind};
use crate::store::RecordStore;

/// Current contents of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub records: Vec<T>,
    /// True until the first load completes, successfully or not.
    pub loading: bool,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loading: true,
        }
    }
}

struct Shared<T: Record> {
    store: Arc<dyn RecordStore<T>>,
    state: watch::Sender<Snapshot<T>>,
    /// True while no change feed delivers this collection's writes back to it.
    optimistic: AtomicBool,
}

impl<T: Record> Shared<T> {
    fn is_optimistic(&self) -> bool {
        self.optimistic.load(Ordering::Acquire)
    }

    /// Stops relying on the change feed. Writes from here on are applied
    /// locally; the caller resyncs to pick up anything the feed missed.
    fn fall_back_to_optimistic(&self) {
        self.optimistic.store(true, Ordering::Release);
    }

    /// Replaces the collection with the store's current contents.
    async fn resync(&self) -> Result<Vec<T>, StoreError> {
        match self.store.list().await {
            Ok(records) => {
                self.state.send_modify(|snapshot| {
                    snapshot.records = records.clone();
                    snapshot.loading = false;
                });
                Ok(records)
            }
            Err(e) => {
                self.state.send_modify(|snapshot| snapshot.loading = false);
                Err(e)
            }
        }
    }
}

/// Background task resynchronizing the collection on every change signal.
struct SyncTask {
    shutdown_tx: watch::Sender<bool>,
}

impl SyncTask {
    fn spawn<T: Record>(shared: Arc<Shared<T>>, feed: ChangeSubscription) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(run_sync(shared, feed, shutdown_rx));
        Self { shutdown_tx }
    }

    fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for SyncTask {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_sync<T: Record>(
    shared: Arc<Shared<T>>,
    mut feed: ChangeSubscription,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            signal = feed.next() => match signal {
                Some(signal) => {
                    match signal {
                        ChangeSignal::Changed(op) => debug!(kind = %T::KIND, ?op, "Resynchronizing after change"),
                        ChangeSignal::Lagged(missed) => debug!(kind = %T::KIND, missed, "Resynchronizing after missed changes"),
                    }
                    if let Err(e) = shared.resync().await {
                        warn!(kind = %T::KIND, error = %e, "Resynchronization failed, keeping last known records");
                    }
                }
                None => {
                    warn!(kind = %T::KIND, "Change feed closed, applying writes locally");
                    shared.fall_back_to_optimistic();
                    if let Err(e) = shared.resync().await {
                        warn!(kind = %T::KIND, error = %e, "Resynchronization after feed loss failed");
                    }
                    break;
                }
            },
            _ = shutdown_rx.changed() => break,
        }
    }
}

/// A reactive collection of one record kind backed by a [`RecordStore`].
///
/// Consumers read the latest [`Snapshot`] or [`subscribe`](Self::subscribe)
/// to be woken on every change. When the store has a change feed the
/// collection resynchronizes from the store on each notification; otherwise
/// mutations are applied to the collection directly.
pub struct CollectionGateway<T: Record> {
    shared: Arc<Shared<T>>,
    sync: Option<SyncTask>,
}

impl<T: Record> CollectionGateway<T> {
    /// Wraps `store`, subscribing to its change feed if it has one.
    ///
    /// Must be called within a Tokio runtime when the store has a change feed.
    pub fn new(store: Arc<dyn RecordStore<T>>) -> Self {
        let feed = store.change_feed();
        let (state, _) = watch::channel(Snapshot::default());
        let shared = Arc::new(Shared {
            store,
            state,
            optimistic: AtomicBool::new(feed.is_none()),
        });
        let sync = feed.map(|feed| SyncTask::spawn(shared.clone(), feed));

        Self { shared, sync }
    }

    pub fn kind(&self) -> RecordKind {
        T::KIND
    }

    pub fn backend(&self) -> BackendKind {
        self.shared.store.backend()
    }

    /// Whether the collection follows a live change feed.
    pub fn is_live(&self) -> bool {
        !self.shared.is_optimistic()
    }

    /// Receiver woken on every change to the collection.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.shared.state.borrow().clone()
    }

    pub fn records(&self) -> Vec<T> {
        self.shared.state.borrow().records.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().loading
    }

    pub fn get(&self, id: &RecordId) -> Option<T> {
        self.shared
            .state
            .borrow()
            .records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Loads all records from the store.
    ///
    /// A failure is logged and the collection keeps its last known records;
    /// the loading flag is cleared either way.
    pub async fn load(&self) -> Vec<T> {
        match self.shared.resync().await {
            Ok(records) => {
                info!(kind = %T::KIND, count = records.len(), "Collection loaded");
                records
            }
            Err(e) => {
                error!(kind = %T::KIND, error = %e, "Failed to load collection");
                self.records()
            }
        }
    }

    /// Reloads from the store, returning the error instead of swallowing it.
    pub async fn refresh(&self) -> Result<Vec<T>, StoreError> {
        self.shared.resync().await
    }

    /// Validates and stores a new record.
    pub async fn add(&self, draft: T::Draft) -> Result<T, StoreError> {
        let draft = T::normalize(draft);
        draft.validate()?;

        let record = self.shared.store.insert(draft).await.map_err(|e| {
            error!(kind = %T::KIND, error = %e, "Failed to add record");
            e
        })?;

        if self.shared.is_optimistic() {
            self.shared.state.send_if_modified(|snapshot| {
                if snapshot.records.iter().any(|r| r.id() == record.id()) {
                    return false;
                }
                snapshot.records.push(record.clone());
                T::order(&mut snapshot.records);
                true
            });
        }
        debug!(kind = %T::KIND, id = %record.id(), "Record added");
        Ok(record)
    }

    /// Replaces all mutable fields of the record with `id`.
    pub async fn update(&self, id: &RecordId, draft: T::Draft) -> Result<T, StoreError> {
        let draft = T::normalize(draft);
        draft.validate()?;

        let record = self.shared.store.update(id, draft).await.map_err(|e| {
            error!(kind = %T::KIND, id = %id, error = %e, "Failed to update record");
            e
        })?;

        self.replace_local(record.clone());
        debug!(kind = %T::KIND, id = %id, "Record updated");
        Ok(record)
    }

    /// Removes the record with `id` from the store and the collection.
    pub async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        self.shared.store.delete(id).await.map_err(|e| {
            error!(kind = %T::KIND, id = %id, error = %e, "Failed to delete record");
            e
        })?;

        self.shared
            .state
            .send_if_modified(|snapshot| {
                let before = snapshot.records.len();
                snapshot.records.retain(|r| r.id() != id);
                snapshot.records.len() != before
            });
        debug!(kind = %T::KIND, id = %id, "Record deleted");
        Ok(())
    }

    /// Swaps in `record` for the collection entry with the same id, if present.
    pub(crate) fn replace_local(&self, record: T) {
        self.shared.state.send_if_modified(|snapshot| {
            match snapshot.records.iter_mut().find(|r| r.id() == record.id()) {
                Some(slot) => {
                    *slot = record;
                    T::order(&mut snapshot.records);
                    true
                }
                None => false,
            }
        });
    }

    /// Releases the change subscription. The collection keeps its records and
    /// applies its own writes, but no longer sees changes from other clients.
    pub fn close(&mut self) {
        if let Some(sync) = self.sync.take() {
            sync.stop();
            self.shared.fall_back_to_optimistic();
            debug!(kind = %T::KIND, "Collection closed");
        }
    }
}

impl<T: Record> Drop for CollectionGateway<T> {
    fn drop(&mut self) {
        self.close();
    }
}
