#![forbid(unsafe_code)]

pub mod fs_content;
pub mod json_store;
pub mod repository;

pub use fs_content::FsContentSource;
pub use json_store::JsonStore;
pub use repository::{
    ChatHistoryRepository, ContentSource, InMemoryContentSource, InMemoryStore,
    PreferencesRepository, ProgressMap, ProgressRepository, StorageError,
};
