//! Storage backend trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Generic string key-value store trait
///
/// Backends provide last-writer-wins semantics per key and no TTL or type
/// support of their own; expiry, typing and namespacing are layered on top
/// by [`StorageManager`](crate::infrastructure::StorageManager). The trait
/// uses raw strings to be dyn-compatible.
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    /// Reads the raw value stored under a key
    async fn read(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Writes a raw value under a key, replacing any previous value
    async fn write(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Removes a key, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool, DomainError>;

    /// Lists every raw key in the store, across all namespaces
    async fn keys(&self) -> Result<Vec<String>, DomainError>;
}
