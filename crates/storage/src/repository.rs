use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use labs_core::model::{ChatMessage, LabProgress, Preferences};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted progress map, keyed by lab id.
pub type ProgressMap = HashMap<String, LabProgress>;

/// Persistence contract for lab progress.
///
/// Commits are synchronous and replace the whole map; last write wins.
pub trait ProgressRepository: Send + Sync {
    /// Load the persisted progress map.
    ///
    /// An absent store reads as an empty map, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or decoded.
    fn load_progress(&self) -> Result<ProgressMap, StorageError>;

    /// Atomically replace the persisted progress map.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    fn save_progress(&self, progress: &ProgressMap) -> Result<(), StorageError>;
}

/// Persistence contract for user preferences.
pub trait PreferencesRepository: Send + Sync {
    /// Load preferences, `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or decoded.
    fn load_preferences(&self) -> Result<Option<Preferences>, StorageError>;

    /// Replace the persisted preferences.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    fn save_preferences(&self, preferences: &Preferences) -> Result<(), StorageError>;
}

/// Persistence contract for the help overlay's chat log.
pub trait ChatHistoryRepository: Send + Sync {
    /// Load the persisted history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or decoded.
    fn load_history(&self) -> Result<Vec<ChatMessage>, StorageError>;

    /// Replace the persisted history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    fn save_history(&self, history: &[ChatMessage]) -> Result<(), StorageError>;

    /// Remove the persisted history entirely.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared.
    fn clear_history(&self) -> Result<(), StorageError>;
}

/// Read-only source of catalog and lab documents.
///
/// Fetches are the only asynchronous suspension points in the system; there
/// is no cancellation, and callers serialize their own requests.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the catalog document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be retrieved.
    async fn fetch_catalog(&self) -> Result<String, StorageError>;

    /// Fetch one lab's detail document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown labs, or other storage
    /// errors.
    async fn fetch_lab_document(&self, lab_id: &str) -> Result<String, StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATIONS ─────────────────────────────────────────────────
//

/// Simple in-memory persistence for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    progress: Arc<Mutex<ProgressMap>>,
    preferences: Arc<Mutex<Option<Preferences>>>,
    history: Arc<Mutex<Vec<ChatMessage>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressRepository for InMemoryStore {
    fn load_progress(&self) -> Result<ProgressMap, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save_progress(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = progress.clone();
        Ok(())
    }
}

impl PreferencesRepository for InMemoryStore {
    fn load_preferences(&self) -> Result<Option<Preferences>, StorageError> {
        let guard = self
            .preferences
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(*guard)
    }

    fn save_preferences(&self, preferences: &Preferences) -> Result<(), StorageError> {
        let mut guard = self
            .preferences
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(*preferences);
        Ok(())
    }
}

impl ChatHistoryRepository for InMemoryStore {
    fn load_history(&self) -> Result<Vec<ChatMessage>, StorageError> {
        let guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save_history(&self, history: &[ChatMessage]) -> Result<(), StorageError> {
        let mut guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = history.to_vec();
        Ok(())
    }

    fn clear_history(&self) -> Result<(), StorageError> {
        let mut guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clear();
        Ok(())
    }
}

/// In-memory content source for tests.
#[derive(Clone, Default)]
pub struct InMemoryContentSource {
    catalog: Arc<Mutex<Option<String>>>,
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryContentSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the catalog document this source serves.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_catalog(&self, text: impl Into<String>) {
        *self.catalog.lock().expect("catalog lock poisoned") = Some(text.into());
    }

    /// Register a lab detail document.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert_document(&self, lab_id: impl Into<String>, text: impl Into<String>) {
        self.documents
            .lock()
            .expect("documents lock poisoned")
            .insert(lab_id.into(), text.into());
    }
}

#[async_trait]
impl ContentSource for InMemoryContentSource {
    async fn fetch_catalog(&self) -> Result<String, StorageError> {
        let guard = self
            .catalog
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clone().ok_or(StorageError::NotFound)
    }

    async fn fetch_lab_document(&self, lab_id: &str) -> Result<String, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(lab_id).cloned().ok_or(StorageError::NotFound)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_progress_round_trips() {
        let store = InMemoryStore::new();
        let mut map = ProgressMap::new();
        map.insert(
            "intro-lab".into(),
            LabProgress {
                progress: 50,
                completed: false,
                bookmarked: true,
            },
        );
        store.save_progress(&map).unwrap();
        assert_eq!(store.load_progress().unwrap(), map);
    }

    #[tokio::test]
    async fn in_memory_source_serves_registered_documents() {
        let source = InMemoryContentSource::new();
        source.set_catalog("| A | [a](./labs/a/) | d |");
        source.insert_document("a", "# A");

        assert!(source.fetch_catalog().await.is_ok());
        assert!(source.fetch_lab_document("a").await.is_ok());
        assert!(matches!(
            source.fetch_lab_document("missing").await,
            Err(StorageError::NotFound)
        ));
    }
}
