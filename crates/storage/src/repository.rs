use async_trait::async_trait;
use chrono::{DateTime, Utc};
use learn_core::model::ProgressDocument;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::codec;

/// Slot name used when no storage key is configured.
pub const DEFAULT_STORAGE_KEY: &str = "codelearning_progress";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// True when a record exists but cannot be decoded.
    #[must_use]
    pub fn is_corrupt_record(&self) -> bool {
        matches!(self, StorageError::Serialization(_))
    }
}

/// Persisted shape of the progress slot: the encoded document plus the time
/// it was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub document: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository contract for the single progress slot.
///
/// Each repository instance is bound to one storage key.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Read and decode the stored document.
    ///
    /// Returns `Ok(None)` when nothing has been stored under the key yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored record cannot be
    /// decoded, or `StorageError::Connection` if the backend fails.
    async fn load_progress(&self) -> Result<Option<ProgressDocument>, StorageError>;

    /// Encode and store the document, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be encoded or written.
    async fn save_progress(
        &self,
        progress: &ProgressDocument,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// When the slot was last written, if it exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend fails.
    async fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Documents are kept encoded, exactly as a durable backend would hold them,
/// so corrupt records can be planted with [`InMemoryRepository::put_raw`].
#[derive(Clone)]
pub struct InMemoryRepository {
    key: String,
    slots: Arc<Mutex<HashMap<String, ProgressRecord>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(DEFAULT_STORAGE_KEY)
    }

    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// A view of the same slots bound to a different key.
    #[must_use]
    pub fn for_key(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            slots: Arc::clone(&self.slots),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store raw text under this repository's key, bypassing encoding.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the slot map is poisoned.
    pub fn put_raw(
        &self,
        document: impl Into<String>,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(
            self.key.clone(),
            ProgressRecord {
                document: document.into(),
                updated_at: saved_at,
            },
        );
        Ok(())
    }

    /// Raw record stored under this repository's key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the slot map is poisoned.
    pub fn raw(&self) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&self.key).cloned())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self) -> Result<Option<ProgressDocument>, StorageError> {
        self.raw()?
            .map(|record| codec::decode(&record.document))
            .transpose()
    }

    async fn save_progress(
        &self,
        progress: &ProgressDocument,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let document = codec::encode(progress)?;
        self.put_raw(document, saved_at)
    }

    async fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        Ok(self.raw()?.map(|record| record.updated_at))
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learn_core::model::{CourseId, LessonId, LessonKey};
    use learn_core::time::fixed_now;

    fn sample_progress() -> ProgressDocument {
        let mut progress = ProgressDocument::new();
        let key = LessonKey::new(CourseId::new("html"), LessonId::new(1));
        progress.complete_lesson(key, Some(12));
        progress
    }

    #[tokio::test]
    async fn empty_slot_loads_as_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_progress().await.unwrap().is_none());
        assert!(repo.last_saved_at().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn round_trips_document_and_timestamp() {
        let repo = InMemoryRepository::new();
        let progress = sample_progress();
        repo.save_progress(&progress, fixed_now()).await.unwrap();

        let loaded = repo.load_progress().await.unwrap().unwrap();
        assert_eq!(loaded, progress);
        assert_eq!(repo.last_saved_at().await.unwrap(), Some(fixed_now()));
    }

    #[tokio::test]
    async fn corrupt_record_surfaces_serialization_error() {
        let repo = InMemoryRepository::new();
        repo.put_raw("{\"completedLessons\": 3", fixed_now()).unwrap();

        let err = repo.load_progress().await.unwrap_err();
        assert!(err.is_corrupt_record());
    }

    #[tokio::test]
    async fn keys_are_isolated_slots() {
        let repo = InMemoryRepository::new();
        let other = repo.for_key("someone_else");
        repo.save_progress(&sample_progress(), fixed_now()).await.unwrap();

        assert!(other.load_progress().await.unwrap().is_none());
        assert_eq!(other.key(), "someone_else");
        assert_eq!(repo.key(), DEFAULT_STORAGE_KEY);
    }
}
