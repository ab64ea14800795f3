//! Asante client storage service
//!
//! A namespaced, TTL-aware key-value storage layer with:
//! - Two backing stores (persistent file-backed, session-scoped in-memory)
//! - Lazy expiry on read plus scheduled sweeps for expired and corrupted
//!   entries
//! - A typed key registry and application facade (preferences, auth token,
//!   API response cache, analytics event log)
//! - Availability probing with graceful whole-session degradation
//! - Change notifications over a broadcast channel

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use std::str::FromStr;

use infrastructure::{BackendFactory, BackendKind, FacadeConfig, ServiceConfig, StorageService};

/// Builds the storage service from application configuration
///
/// Opens the persistent store of the configured kind (file-backed by
/// default) and pairs it with a fresh session store. The service is not
/// started; call [`StorageService::start`] to probe availability and begin
/// the sweeps.
pub fn create_storage_service(config: &AppConfig) -> anyhow::Result<Arc<StorageService>> {
    let kind = BackendKind::from_str(&config.storage.backend).unwrap_or_default();
    let persistent = BackendFactory::create(&kind, config.storage.resolve_data_file())?;
    let session = BackendFactory::create_memory();

    let facade_config = FacadeConfig {
        persistent_prefix: config.storage.persistent_prefix.clone(),
        session_prefix: config.storage.session_prefix.clone(),
        encode: config.storage.encode,
    };

    let service_config = ServiceConfig {
        expiry_sweep_interval: config.storage.expiry_sweep_interval(),
        size_check_interval: config.storage.size_check_interval(),
        max_total_bytes: config.storage.max_total_bytes,
    };

    Ok(Arc::new(StorageService::new(
        persistent,
        session,
        facade_config,
        service_config,
    )))
}
