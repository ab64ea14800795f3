//! Storage backend implementations

mod factory;
mod file;
mod memory;

pub use factory::{BackendFactory, BackendKind};
pub use file::FileBackend;
pub use memory::MemoryBackend;
