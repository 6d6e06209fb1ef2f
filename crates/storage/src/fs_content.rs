//! Filesystem content source.
//!
//! Reads the catalog from a fixed path and lab detail documents from
//! `<labs-root>/<lab-id>/README.md`.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::repository::{ContentSource, StorageError};

const LAB_DOCUMENT_NAME: &str = "README.md";

/// Content source backed by a directory of lab documents.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    catalog_path: PathBuf,
    labs_root: PathBuf,
}

impl FsContentSource {
    #[must_use]
    pub fn new(catalog_path: impl Into<PathBuf>, labs_root: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            labs_root: labs_root.into(),
        }
    }
}

#[async_trait]
impl ContentSource for FsContentSource {
    async fn fetch_catalog(&self) -> Result<String, StorageError> {
        tokio::fs::read_to_string(&self.catalog_path)
            .await
            .map_err(map_io)
    }

    async fn fetch_lab_document(&self, lab_id: &str) -> Result<String, StorageError> {
        let path = self.labs_root.join(lab_id).join(LAB_DOCUMENT_NAME);
        tokio::fs::read_to_string(path).await.map_err(map_io)
    }
}

fn map_io(error: std::io::Error) -> StorageError {
    if error.kind() == ErrorKind::NotFound {
        StorageError::NotFound
    } else {
        StorageError::Connection(error.to_string())
    }
}
