//! Domain layer - Core types and trait definitions

pub mod analytics;
pub mod auth;
pub mod error;
pub mod storage;

pub use analytics::AnalyticsEvent;
pub use auth::{AuthUser, Credentials, SessionToken, UserRole};
pub use error::DomainError;
pub use storage::{now_millis, StorageBackend, StorageEvent, StorageItem, StorageKey};
