//! Storage domain - backend trait, entry envelope and key registry

mod backend;
mod events;
mod item;
mod registry;

pub use backend::StorageBackend;
#[cfg(test)]
pub use backend::mock::MockBackend;
pub use events::StorageEvent;
pub use item::{now_millis, StorageItem};
pub use registry::StorageKey;
