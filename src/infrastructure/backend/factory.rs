//! Backend factory for runtime selection

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::{DomainError, StorageBackend};

use super::file::FileBackend;
use super::memory::MemoryBackend;

/// Supported backend kinds
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BackendKind {
    /// File-backed persistent store
    #[default]
    File,
    /// Process-lifetime in-memory store
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::File => write!(f, "file"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(BackendKind::File),
            "memory" | "in_memory" | "inmemory" => Ok(BackendKind::Memory),
            _ => Err(DomainError::configuration(format!(
                "Unknown backend kind: {}. Valid kinds: file, memory",
                s
            ))),
        }
    }
}

/// Factory for creating storage backends
#[derive(Debug, Default)]
pub struct BackendFactory;

impl BackendFactory {
    /// Creates a backend of the given kind
    ///
    /// `path` is where a file-backed store keeps its snapshot; a memory
    /// backend ignores it.
    pub fn create(
        kind: &BackendKind,
        path: impl Into<PathBuf>,
    ) -> Result<Arc<dyn StorageBackend>, DomainError> {
        match kind {
            BackendKind::File => Self::create_file(path),
            BackendKind::Memory => Ok(Self::create_memory()),
        }
    }

    /// Creates a persistent file-backed store at the given path
    pub fn create_file(path: impl Into<PathBuf>) -> Result<Arc<dyn StorageBackend>, DomainError> {
        Ok(Arc::new(FileBackend::open(path)?))
    }

    /// Creates a session-scoped in-memory store
    pub fn create_memory() -> Arc<dyn StorageBackend> {
        Arc::new(MemoryBackend::new())
    }
}
