//! Storage change notifications

/// Change notification emitted after a mutation
///
/// Keys are logical (prefix stripped). Lazy eviction of an expired entry
/// emits `Removed` just like an explicit removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    /// A key was written
    Updated { key: String },
    /// A key was removed, explicitly or by eviction
    Removed { key: String },
    /// An entire namespace was cleared
    Cleared { prefix: String },
}

impl StorageEvent {
    /// The logical key this event concerns, if key-scoped
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Updated { key } | Self::Removed { key } => Some(key),
            Self::Cleared { .. } => None,
        }
    }
}
