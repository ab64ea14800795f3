//! Storage lifecycle service
//!
//! Owns the process-wide concerns the facade itself stays free of: probing
//! backend availability at startup, the periodic expiry and corruption
//! sweeps, the size guard, and the best-effort analytics flush at shutdown.
//! The managers expire lazily on read; this service is the complementary
//! push-based layer that sweeps proactively on a schedule. The two
//! strategies are independent and composable.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{StorageBackend, StorageEvent};

use super::facade::{AppStorage, FacadeConfig};

/// Lifecycle configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// How often the expiry sweep runs
    pub expiry_sweep_interval: Duration,
    /// How often the size guard checks the combined footprint
    pub size_check_interval: Duration,
    /// Hard limit on the combined approximate size of both stores
    pub max_total_bytes: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            expiry_sweep_interval: Duration::from_secs(30 * 60),
            size_check_interval: Duration::from_secs(5 * 60),
            max_total_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Per-session availability state
///
/// `Unavailable` is terminal: there is no re-probe for the rest of the
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AvailabilityState {
    Uninitialized = 0,
    Probing = 1,
    Available = 2,
    Unavailable = 3,
}

impl AvailabilityState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Probing,
            2 => Self::Available,
            3 => Self::Unavailable,
            _ => Self::Uninitialized,
        }
    }
}

/// Process-wide storage lifecycle owner
#[derive(Debug)]
pub struct StorageService {
    storage: Arc<AppStorage>,
    persistent_backend: Arc<dyn StorageBackend>,
    session_backend: Arc<dyn StorageBackend>,
    config: ServiceConfig,
    state: AtomicU8,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl StorageService {
    /// Creates the service and its facade over the given backends
    pub fn new(
        persistent_backend: Arc<dyn StorageBackend>,
        session_backend: Arc<dyn StorageBackend>,
        facade_config: FacadeConfig,
        config: ServiceConfig,
    ) -> Self {
        let storage = Arc::new(AppStorage::new(
            persistent_backend.clone(),
            session_backend.clone(),
            facade_config,
        ));

        Self {
            storage,
            persistent_backend,
            session_backend,
            config,
            state: AtomicU8::new(AvailabilityState::Uninitialized as u8),
            tasks: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// The typed storage facade
    pub fn storage(&self) -> Arc<AppStorage> {
        self.storage.clone()
    }

    /// Current availability state
    pub fn state(&self) -> AvailabilityState {
        AvailabilityState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Whether the probe succeeded and storage operations are honored
    pub fn is_available(&self) -> bool {
        self.state() == AvailabilityState::Available
    }

    /// Subscribes to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.storage.subscribe()
    }

    /// Probes the backends and, if they respond, starts the background
    /// sweeps
    ///
    /// A failed probe disables the facade for the rest of the session; the
    /// host application keeps running, it just loses persistence.
    pub async fn start(self: &Arc<Self>) -> bool {
        self.state
            .store(AvailabilityState::Probing as u8, Ordering::Relaxed);

        let persistent_ok = Self::probe(self.persistent_backend.as_ref()).await;
        let session_ok = Self::probe(self.session_backend.as_ref()).await;

        if !persistent_ok || !session_ok {
            warn!(
                persistent_ok,
                session_ok, "storage probe failed, disabling storage for this session"
            );
            self.state
                .store(AvailabilityState::Unavailable as u8, Ordering::Relaxed);
            self.storage.set_enabled(false);
            return false;
        }

        self.state
            .store(AvailabilityState::Available as u8, Ordering::Relaxed);
        info!("storage available");

        self.spawn_sweeps();
        true
    }

    /// Writes and removes a throwaway key to verify the backend responds
    async fn probe(backend: &dyn StorageBackend) -> bool {
        let key = format!("__asante_probe_{}", Uuid::new_v4());

        match backend.write(&key, "probe").await {
            Ok(()) => {
                if let Err(e) = backend.remove(&key).await {
                    warn!(error = %e, "probe cleanup failed");
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "probe write failed");
                false
            }
        }
    }

    fn spawn_sweeps(self: &Arc<Self>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());

        // Corrupted-entry sweep runs once, before the first expiry sweep;
        // the expiry sweep then repeats on its interval.
        let storage = self.storage.clone();
        let expiry_interval = self.config.expiry_sweep_interval;
        tasks.push(tokio::spawn(async move {
            let removed = storage.cleanup_corrupted().await;
            if removed > 0 {
                info!(removed, "corrupted-entry sweep done");
            }

            loop {
                let evicted = storage.cleanup().await;
                if evicted > 0 {
                    info!(evicted, "expiry sweep done");
                }
                tokio::time::sleep(expiry_interval).await;
            }
        }));

        let storage = self.storage.clone();
        let check_interval = self.config.size_check_interval;
        let max_bytes = self.config.max_total_bytes;
        tasks.push(tokio::spawn(async move {
            loop {
                tokio::time::sleep(check_interval).await;

                let size = storage.approx_size().await;

                if size > max_bytes {
                    warn!(size, max_bytes, "storage over size limit");
                }

                if size > max_bytes * 8 / 10 {
                    let evicted = storage.cleanup().await;
                    info!(size, evicted, "size guard ran expiry cleanup");
                }
            }
        }));
    }

    /// Stops the sweeps and logs any analytics events still pending
    ///
    /// The flush is advisory: events are reported, not delivered anywhere.
    pub async fn shutdown(&self) {
        let tasks: Vec<JoinHandle<()>> = {
            let mut guard = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
            guard.drain(..).collect()
        };

        for task in tasks {
            task.abort();
        }

        let pending = self.storage.analytics_events().await.len();
        if pending > 0 {
            info!(pending, "analytics events pending at shutdown");
        }
    }

    /// Evicts expired entries across both stores
    pub async fn cleanup(&self) -> usize {
        self.storage.cleanup().await
    }

    /// Removes unparseable entries across both stores
    pub async fn cleanup_corrupted(&self) -> usize {
        self.storage.cleanup_corrupted().await
    }

    /// Combined approximate size of both stores
    pub async fn approx_size(&self) -> u64 {
        self.storage.approx_size().await
    }

    /// Clears both stores
    pub async fn clear_all(&self) -> bool {
        self.storage.clear_all().await
    }
}

impl Drop for StorageService {
    fn drop(&mut self) {
        let guard = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        for task in guard.iter() {
            task.abort();
        }
    }
}
