//! Infrastructure layer - Storage backends and services

pub mod auth;
pub mod backend;
pub mod facade;
pub mod logging;
pub mod manager;
pub mod service;

pub use auth::AuthService;
pub use backend::{BackendFactory, BackendKind, FileBackend, MemoryBackend};
pub use facade::{AppStorage, FacadeConfig, AUTH_TOKEN_TTL};
pub use manager::{ManagerConfig, StorageManager};
pub use service::{AvailabilityState, ServiceConfig, StorageService};
