//! JSON-file key-value persistence.
//!
//! Each namespace key lives in its own file under a data directory. Writes
//! go through a temp file followed by a rename so a commit is never visible
//! half-written.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use labs_core::model::{ChatMessage, Preferences};

use crate::repository::{
    ChatHistoryRepository, PreferencesRepository, ProgressMap, ProgressRepository, StorageError,
};

const PROGRESS_KEY: &str = "labs-progress.json";
const PREFERENCES_KEY: &str = "labs-preferences.json";
const CHAT_KEY: &str = "labs-chat.json";

/// Directory-backed JSON store for progress, preferences and chat history.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open (creating if necessary) a store rooted at the given directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { dir })
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let raw = match fs::read_to_string(self.dir.join(key)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Connection(e.to_string())),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn write_key<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let tmp = self.dir.join(format!("{key}.tmp"));
        fs::write(&tmp, raw).map_err(|e| StorageError::Connection(e.to_string()))?;
        fs::rename(&tmp, self.dir.join(key))
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn remove_key(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.dir.join(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Connection(e.to_string())),
        }
    }
}

impl ProgressRepository for JsonStore {
    fn load_progress(&self) -> Result<ProgressMap, StorageError> {
        Ok(self.read_key(PROGRESS_KEY)?.unwrap_or_default())
    }

    fn save_progress(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        self.write_key(PROGRESS_KEY, progress)
    }
}

impl PreferencesRepository for JsonStore {
    fn load_preferences(&self) -> Result<Option<Preferences>, StorageError> {
        self.read_key(PREFERENCES_KEY)
    }

    fn save_preferences(&self, preferences: &Preferences) -> Result<(), StorageError> {
        self.write_key(PREFERENCES_KEY, preferences)
    }
}

impl ChatHistoryRepository for JsonStore {
    fn load_history(&self) -> Result<Vec<ChatMessage>, StorageError> {
        Ok(self.read_key(CHAT_KEY)?.unwrap_or_default())
    }

    fn save_history(&self, history: &[ChatMessage]) -> Result<(), StorageError> {
        self.write_key(CHAT_KEY, &history)
    }

    fn clear_history(&self) -> Result<(), StorageError> {
        self.remove_key(CHAT_KEY)
    }
}
