//! File-backed storage backend
//!
//! The persistent store: a string map snapshotted to a JSON file on every
//! mutation. Data volumes stay in the low-megabyte range, so whole-file
//! rewrites are acceptable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{DomainError, StorageBackend};

/// Persistent string key-value store backed by a JSON file
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    /// Opens the store at `path`, loading any existing snapshot
    ///
    /// A missing file starts an empty store. An unreadable or unparseable
    /// snapshot is discarded with a warning rather than failing open; the
    /// layer exists to tolerate corrupted client state, not to propagate it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::storage(format!(
                    "failed to create storage directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "storage snapshot is not valid JSON, starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read storage snapshot, starting empty"
                );
                HashMap::new()
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// The snapshot file this store writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, DomainError> {
        self.entries
            .lock()
            .map_err(|_| DomainError::storage("file backend lock poisoned"))
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), DomainError> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| DomainError::serialization(format!("snapshot serialization: {}", e)))?;

        std::fs::write(&self.path, raw).map_err(|e| {
            DomainError::storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut entries = self.lock()?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    async fn remove(&self, key: &str) -> Result<bool, DomainError> {
        let mut entries = self.lock()?;
        let existed = entries.remove(key).is_some();

        if existed {
            self.flush(&entries)?;
        }

        Ok(existed)
    }

    async fn keys(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        (dir, path)
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (_dir, path) = temp_store();
        let backend = FileBackend::open(&path).unwrap();

        backend.write("key1", "value1").await.unwrap();

        let result = backend.read("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let (_dir, path) = temp_store();

        {
            let backend = FileBackend::open(&path).unwrap();
            backend.write("theme", "\"dark\"").await.unwrap();
        }

        let reopened = FileBackend::open(&path).unwrap();
        let result = reopened.read("theme").await.unwrap();
        assert_eq!(result, Some("\"dark\"".to_string()));
    }

    #[tokio::test]
    async fn test_remove_persists() {
        let (_dir, path) = temp_store();

        {
            let backend = FileBackend::open(&path).unwrap();
            backend.write("key1", "value1").await.unwrap();
            assert!(backend.remove("key1").await.unwrap());
        }

        let reopened = FileBackend::open(&path).unwrap();
        assert!(reopened.read("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let (_dir, path) = temp_store();
        std::fs::write(&path, "{not json").unwrap();

        let backend = FileBackend::open(&path).unwrap();
        assert!(backend.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let (_dir, path) = temp_store();

        let backend = FileBackend::open(&path).unwrap();
        assert!(backend.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("storage.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.write("key1", "value1").await.unwrap();

        assert!(path.exists());
    }
}
