//! Reactive collections consumed by the host application.

pub mod attendance;
pub mod collection;

pub use attendance::{AttendanceGateway, UpsertOutcome};
pub use collection::{CollectionGateway, Snapshot};

use domain::models::{ClassRoom, Student};
use tracing::info;

use crate::config::{BackendKind, StoreConfig};
use crate::error::StoreError;
use crate::store::Stores;

/// The three record collections, all served by one backend.
pub struct PersistenceGateway {
    backend: BackendKind,
    classes: CollectionGateway<ClassRoom>,
    students: CollectionGateway<Student>,
    attendance: AttendanceGateway,
}

impl PersistenceGateway {
    /// Selects and opens the backend, then wraps each store in a collection.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let stores = Stores::open(config).await?;
        Ok(Self::from_stores(stores))
    }

    pub fn from_stores(stores: Stores) -> Self {
        Self {
            backend: stores.backend,
            classes: CollectionGateway::new(stores.classes),
            students: CollectionGateway::new(stores.students),
            attendance: AttendanceGateway::new(stores.attendance, stores.attendance_slots),
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn classes(&self) -> &CollectionGateway<ClassRoom> {
        &self.classes
    }

    pub fn students(&self) -> &CollectionGateway<Student> {
        &self.students
    }

    pub fn attendance(&self) -> &AttendanceGateway {
        &self.attendance
    }

    /// Loads all three collections concurrently. Each kind loads
    /// independently; a failure in one leaves the others unaffected.
    pub async fn load_all(&self) {
        let (classes, students, attendance) = tokio::join!(
            self.classes.load(),
            self.students.load(),
            self.attendance.load(),
        );
        info!(
            backend = %self.backend,
            classes = classes.len(),
            students = students.len(),
            attendance = attendance.len(),
            "Collections loaded"
        );
    }

    /// Reloads all three collections, returning the first error.
    pub async fn refresh_all(&self) -> Result<(), StoreError> {
        let (classes, students, attendance) = tokio::join!(
            self.classes.refresh(),
            self.students.refresh(),
            self.attendance.refresh(),
        );
        classes?;
        students?;
        attendance?;
        Ok(())
    }

    /// Releases all change subscriptions.
    pub fn close(&mut self) {
        self.classes.close();
        self.students.close();
        self.attendance.collection_mut().close();
    }
}
