//! In-memory storage backend
//!
//! The session-scoped store: contents live for the process lifetime only.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{DomainError, StorageBackend};

/// Process-lifetime string key-value store
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, DomainError> {
        self.entries
            .lock()
            .map_err(|_| DomainError::storage("memory backend lock poisoned"))
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.lock()?.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read() {
        let backend = MemoryBackend::new();

        backend.write("key1", "value1").await.unwrap();

        let result = backend.read("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_read_missing() {
        let backend = MemoryBackend::new();

        let result = backend.read("missing").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_write_replaces() {
        let backend = MemoryBackend::new();

        backend.write("key1", "old").await.unwrap();
        backend.write("key1", "new").await.unwrap();

        let result = backend.read("key1").await.unwrap();
        assert_eq!(result, Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_remove() {
        let backend = MemoryBackend::new();

        backend.write("key1", "value1").await.unwrap();

        assert!(backend.remove("key1").await.unwrap());
        assert!(!backend.remove("key1").await.unwrap());
        assert!(backend.read("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys() {
        let backend = MemoryBackend::new();

        backend.write("a", "1").await.unwrap();
        backend.write("b", "2").await.unwrap();

        let mut keys = backend.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
