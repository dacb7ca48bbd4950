//! File-backed local store.
//!
//! Each record kind lives in its own slot file (`classes.json`,
//! `students.json`, `attendance.json`) holding a JSON array of records.
//! Writes replace the whole file through a temporary file and a rename.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use domain::models::{
    AttendanceRecord, AttendanceSlot, AttendanceStatus, ClassRoom, RecordId, Student,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::BackendKind;
use crate::error::StoreError;
use crate::metrics::QueryTimer;
use crate::record::Record;
use crate::store::{AttendanceStore, RecordStore, Stores};

/// One slot file and its in-memory copy.
pub struct LocalSlot<T: Record> {
    path: PathBuf,
    records: Mutex<Vec<T>>,
}

impl<T: Record> LocalSlot<T> {
    /// Reads the slot file in `dir`. A missing file is an empty slot; a
    /// corrupt one is logged and treated as empty.
    pub async fn open(dir: &Path) -> Result<Self, StoreError> {
        let path = dir.join(T::KIND.slot_file());
        let records = read_slot::<T>(&path).await?;
        debug!(path = %path.display(), count = records.len(), "Opened local slot");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `records` to the slot file.
    async fn persist(&self, records: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Applies `change` to a copy of the slot, persists it, then commits it.
    async fn mutate<R>(
        &self,
        change: impl FnOnce(&mut Vec<T>) -> Result<R, StoreError> + Send,
    ) -> Result<R, StoreError> {
        let mut guard = self.records.lock().await;
        let mut next = guard.clone();
        let out = change(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }
}

async fn read_slot<T: Record>(path: &Path) -> Result<Vec<T>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice::<Vec<T>>(&bytes) {
        Ok(records) => Ok(records),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Local slot is not valid JSON, starting empty"
            );
            Ok(Vec::new())
        }
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for LocalSlot<T> {
    fn backend(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        let timer = QueryTimer::new(BackendKind::Local, T::KIND, "list");
        let mut records = self.records.lock().await.clone();
        T::order(&mut records);
        timer.record();
        Ok(records)
    }

    async fn insert(&self, draft: T::Draft) -> Result<T, StoreError> {
        let timer = QueryTimer::new(BackendKind::Local, T::KIND, "insert");
        let record = T::from_draft(RecordId::generate(), draft);
        let result = self
            .mutate(|records| {
                records.push(record.clone());
                Ok(record)
            })
            .await;
        timer.finish(result)
    }

    async fn update(&self, id: &RecordId, draft: T::Draft) -> Result<T, StoreError> {
        let timer = QueryTimer::new(BackendKind::Local, T::KIND, "update");
        let result = self
            .mutate(|records| {
                let record = records
                    .iter_mut()
                    .find(|r| r.id() == id)
                    .ok_or_else(|| StoreError::not_found(T::KIND, id))?;
                record.apply(draft);
                Ok(record.clone())
            })
            .await;
        timer.finish(result)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let timer = QueryTimer::new(BackendKind::Local, T::KIND, "delete");
        if !self.records.lock().await.iter().any(|r| r.id() == id) {
            timer.record();
            return Ok(());
        }
        let result = self
            .mutate(|records| {
                records.retain(|r| r.id() != id);
                Ok(())
            })
            .await;
        timer.finish(result)
    }
}

#[async_trait]
impl AttendanceStore for LocalSlot<AttendanceRecord> {
    async fn find_slot(
        &self,
        slot: &AttendanceSlot,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| r.occupies(slot))
            .cloned())
    }

    async fn set_status(
        &self,
        id: &RecordId,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        let timer = QueryTimer::new(BackendKind::Local, AttendanceRecord::KIND, "set_status");
        let result = self
            .mutate(|records| {
                let record = records
                    .iter_mut()
                    .find(|r| &r.id == id)
                    .ok_or_else(|| StoreError::not_found(AttendanceRecord::KIND, id))?;
                record.status = status;
                Ok(record.clone())
            })
            .await;
        timer.finish(result)
    }
}

/// The local backend: one slot per record kind under a single directory.
pub struct LocalStore {
    dir: PathBuf,
    classes: Arc<LocalSlot<ClassRoom>>,
    students: Arc<LocalSlot<Student>>,
    attendance: Arc<LocalSlot<AttendanceRecord>>,
}

impl LocalStore {
    /// Opens (creating if needed) the slot directory and reads all slots.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;

        Ok(Self {
            classes: Arc::new(LocalSlot::open(&dir).await?),
            students: Arc::new(LocalSlot::open(&dir).await?),
            attendance: Arc::new(LocalSlot::open(&dir).await?),
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn into_stores(self) -> Stores {
        Stores {
            backend: BackendKind::Local,
            classes: self.classes,
            students: self.students,
            attendance: self.attendance.clone(),
            attendance_slots: self.attendance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::models::{AttendanceDraft, ClassRoomDraft, StudentDraft};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_missing_slot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let slot = LocalSlot::<ClassRoom>::open(dir.path()).await.unwrap();
        assert!(slot.list().await.unwrap().is_empty());
        assert!(!slot.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_slot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("students.json"), b"{not json").unwrap();

        let slot = LocalSlot::<Student>::open(dir.path()).await.unwrap();
        assert!(slot.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_persists_camel_case_array() {
        let dir = tempfile::tempdir().unwrap();
        let slot = LocalSlot::<Student>::open(dir.path()).await.unwrap();

        let student = slot.insert(StudentDraft::new("Ali", "c1")).await.unwrap();
        assert!(!student.id.is_empty());

        let raw = std::fs::read_to_string(dir.path().join("students.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"id": student.id.as_str(), "name": "Ali", "classId": "c1"}])
        );
        assert!(!dir.path().join("students.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_slot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let slot = LocalSlot::<ClassRoom>::open(dir.path()).await.unwrap();
            slot.insert(ClassRoomDraft::new("5A")).await.unwrap();
            slot.insert(ClassRoomDraft::new("6B")).await.unwrap();
        }

        let slot = LocalSlot::<ClassRoom>::open(dir.path()).await.unwrap();
        let names: Vec<String> = slot.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["5A", "6B"]);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let dir = tempfile::tempdir().unwrap();
        let slot = LocalSlot::<Student>::open(dir.path()).await.unwrap();
        let student = slot.insert(StudentDraft::new("Ali", "c1")).await.unwrap();

        let updated = slot
            .update(&student.id, StudentDraft::new("Ali Veli", "c2"))
            .await
            .unwrap();

        assert_eq!(updated.id, student.id);
        assert_eq!(updated.name, "Ali Veli");
        assert_eq!(updated.class_id, RecordId::new("c2"));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let slot = LocalSlot::<ClassRoom>::open(dir.path()).await.unwrap();

        let err = slot
            .update(&RecordId::new("missing"), ClassRoomDraft::new("5A"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(!slot.path().exists());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let slot = LocalSlot::<ClassRoom>::open(dir.path()).await.unwrap();
        let class = slot.insert(ClassRoomDraft::new("5A")).await.unwrap();

        slot.delete(&RecordId::new("missing")).await.unwrap();
        assert_eq!(slot.list().await.unwrap().len(), 1);

        slot.delete(&class.id).await.unwrap();
        assert!(slot.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_attendance_list_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let slot = LocalSlot::<AttendanceRecord>::open(dir.path()).await.unwrap();
        for d in [9, 11, 10] {
            slot.insert(AttendanceDraft::new(
                AttendanceSlot::new(day(d), "c1", "s1"),
                AttendanceStatus::Present,
            ))
            .await
            .unwrap();
        }

        let dates: Vec<NaiveDate> = slot.list().await.unwrap().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(11), day(10), day(9)]);
    }

    #[tokio::test]
    async fn test_find_slot_and_set_status() {
        let dir = tempfile::tempdir().unwrap();
        let slot = LocalSlot::<AttendanceRecord>::open(dir.path()).await.unwrap();
        let key = AttendanceSlot::new(day(10), "c1", "s1");
        let record = slot
            .insert(AttendanceDraft::new(key.clone(), AttendanceStatus::Present))
            .await
            .unwrap();

        let found = slot.find_slot(&key).await.unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert!(slot
            .find_slot(&AttendanceSlot::new(day(11), "c1", "s1"))
            .await
            .unwrap()
            .is_none());

        let updated = slot.set_status(&record.id, AttendanceStatus::Late).await.unwrap();
        assert_eq!(updated.status, AttendanceStatus::Late);
        assert_eq!(updated.slot(), key);
    }

    #[tokio::test]
    async fn test_store_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested/data");

        let store = LocalStore::open(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());

        let stores = store.into_stores();
        assert_eq!(stores.backend, BackendKind::Local);
    }
}
