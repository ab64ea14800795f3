//! Namespaced, TTL-aware storage manager
//!
//! Wraps a single [`StorageBackend`] with the three things raw stores lack:
//! typing (serde), expiry (a TTL envelope checked lazily on read) and
//! namespacing (a per-manager key prefix, so several managers can share one
//! backend without collisions). No method of this type returns an error:
//! every failure mode, from a disabled backend to malformed stored data,
//! degrades to `None`/`false`/`0`/empty and a `tracing` warning. Calling
//! code always receives a value-or-default, never an exception.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::{now_millis, StorageBackend, StorageEvent, StorageItem};

/// Configuration for a storage manager
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Prefix applied to every key this manager touches
    pub prefix: String,
    /// TTL applied when `set` is called without one
    pub default_ttl: Option<Duration>,
    /// Whether to base64-encode the serialized envelope (reversible
    /// obfuscation, not encryption)
    pub encode: bool,
}

impl ManagerConfig {
    /// Creates a configuration with the given key prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            default_ttl: None,
            encode: false,
        }
    }

    /// Sets the default TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Enables base64 encoding of stored envelopes
    pub fn with_encoding(mut self) -> Self {
        self.encode = true;
        self
    }
}

/// Outcome of inspecting one stored entry
enum Probe {
    /// Present and not expired
    Live,
    /// No entry under the key
    Missing,
    /// Entry was expired and has been removed
    Evicted,
    /// Entry exists but does not decode or parse; left in place for the
    /// corrupted-entry sweep
    Corrupt,
}

/// Type-safe, expiring, namespaced access to one underlying store
#[derive(Debug, Clone)]
pub struct StorageManager {
    backend: Arc<dyn StorageBackend>,
    config: ManagerConfig,
    events: Option<broadcast::Sender<StorageEvent>>,
}

impl StorageManager {
    /// Creates a manager over the given backend
    pub fn new(backend: Arc<dyn StorageBackend>, config: ManagerConfig) -> Self {
        Self {
            backend,
            config,
            events: None,
        }
    }

    /// Attaches a change-notification channel
    pub fn with_events(mut self, events: broadcast::Sender<StorageEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// This manager's key prefix
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// Serializes and stores a value under `prefix + key`
    ///
    /// Falls back to the manager's default TTL when `ttl` is `None`; if
    /// neither is set the entry never expires. Returns `false` on any
    /// serialization or backend failure, leaving a prior value untouched.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool {
        let ttl_ms = ttl
            .or(self.config.default_ttl)
            .map(|d| d.as_millis() as u64);
        let item = StorageItem::new(value, ttl_ms);

        let raw = match serde_json::to_string(&item) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize storage value");
                return false;
            }
        };

        let stored = if self.config.encode {
            BASE64.encode(raw)
        } else {
            raw
        };

        match self.backend.write(&self.full_key(key), &stored).await {
            Ok(()) => {
                self.emit(StorageEvent::Updated {
                    key: key.to_string(),
                });
                true
            }
            Err(e) => {
                warn!(key, error = %e, "failed to write storage value");
                false
            }
        }
    }

    /// Reads a value, enforcing expiry
    ///
    /// An expired entry is deleted and reported as absent (lazy eviction).
    /// An entry that fails to decode or parse is reported as absent but left
    /// in place; removal of corrupt entries belongs to
    /// [`cleanup_corrupted`](Self::cleanup_corrupted).
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.read(&self.full_key(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read storage value");
                return None;
            }
        };

        let decoded = match self.decode(&raw) {
            Some(decoded) => decoded,
            None => {
                warn!(key, "stored value failed to decode, treating as missing");
                return None;
            }
        };

        let item: StorageItem<T> = match serde_json::from_str(&decoded) {
            Ok(item) => item,
            Err(e) => {
                warn!(key, error = %e, "stored value failed to parse, treating as missing");
                return None;
            }
        };

        if item.is_expired() {
            self.evict(key).await;
            return None;
        }

        Some(item.value)
    }

    /// Removes a key; idempotent
    pub async fn remove(&self, key: &str) -> bool {
        match self.backend.remove(&self.full_key(key)).await {
            Ok(existed) => {
                if existed {
                    self.emit(StorageEvent::Removed {
                        key: key.to_string(),
                    });
                }
                true
            }
            Err(e) => {
                warn!(key, error = %e, "failed to remove storage value");
                false
            }
        }
    }

    /// Removes every key under this manager's prefix
    ///
    /// Keys outside the prefix, including another manager's namespace on the
    /// same backend, are untouched.
    pub async fn clear(&self) -> bool {
        let keys = match self.backend.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "failed to list keys for clear");
                return false;
            }
        };

        let mut ok = true;

        for full_key in keys {
            if full_key.starts_with(&self.config.prefix) {
                if let Err(e) = self.backend.remove(&full_key).await {
                    warn!(key = %full_key, error = %e, "failed to remove key during clear");
                    ok = false;
                }
            }
        }

        if ok {
            self.emit(StorageEvent::Cleared {
                prefix: self.config.prefix.clone(),
            });
        }

        ok
    }

    /// Whether a live (non-expired, parseable) entry exists under the key
    ///
    /// An expired entry reports `false` and is evicted as a side effect.
    pub async fn has(&self, key: &str) -> bool {
        matches!(self.probe(key).await, Probe::Live)
    }

    /// Logical keys (prefix stripped) currently present under this prefix
    ///
    /// No TTL filtering: expired-but-not-yet-evicted entries are included.
    pub async fn keys(&self) -> Vec<String> {
        match self.backend.keys().await {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| {
                    k.strip_prefix(&self.config.prefix)
                        .map(|logical| logical.to_string())
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "failed to list storage keys");
                Vec::new()
            }
        }
    }

    /// Approximate footprint of this namespace
    ///
    /// Sums `key.len() + value.len()` over raw stored strings: a cheap
    /// proxy for byte size, not an exact measurement.
    pub async fn size(&self) -> u64 {
        let keys = match self.backend.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "failed to list keys for size");
                return 0;
            }
        };

        let mut total = 0u64;

        for full_key in keys {
            if !full_key.starts_with(&self.config.prefix) {
                continue;
            }

            if let Ok(Some(value)) = self.backend.read(&full_key).await {
                total += (full_key.len() + value.len()) as u64;
            }
        }

        total
    }

    /// Evicts every expired entry under this prefix, returning how many were
    /// removed
    ///
    /// The check and the eviction are fused: each key is probed once, and an
    /// expired probe removes the entry it just found. An immediate second
    /// call returns 0. Corrupt entries are neither counted nor removed here.
    pub async fn cleanup(&self) -> usize {
        let mut evicted = 0;

        for key in self.keys().await {
            if matches!(self.probe(&key).await, Probe::Evicted) {
                evicted += 1;
            }
        }

        if evicted > 0 {
            debug!(prefix = %self.config.prefix, evicted, "expired entries evicted");
        }

        evicted
    }

    /// Removes every entry under this prefix that fails to decode or parse,
    /// returning how many were removed
    ///
    /// Distinct from TTL eviction: this sweep targets malformed data only.
    pub async fn cleanup_corrupted(&self) -> usize {
        let mut removed = 0;

        for key in self.keys().await {
            if matches!(self.probe(&key).await, Probe::Corrupt) {
                if self.remove(&key).await {
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            warn!(prefix = %self.config.prefix, removed, "corrupted entries removed");
        }

        removed
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    fn decode(&self, raw: &str) -> Option<String> {
        if !self.config.encode {
            return Some(raw.to_string());
        }

        let bytes = BASE64.decode(raw).ok()?;
        String::from_utf8(bytes).ok()
    }

    fn emit(&self, event: StorageEvent) {
        if let Some(events) = &self.events {
            // Nobody listening is fine
            let _ = events.send(event);
        }
    }

    async fn evict(&self, key: &str) {
        if let Err(e) = self.backend.remove(&self.full_key(key)).await {
            warn!(key, error = %e, "failed to evict expired entry");
        } else {
            self.emit(StorageEvent::Removed {
                key: key.to_string(),
            });
        }
    }

    async fn probe(&self, key: &str) -> Probe {
        let raw = match self.backend.read(&self.full_key(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Probe::Missing,
            Err(e) => {
                warn!(key, error = %e, "failed to read storage value");
                return Probe::Missing;
            }
        };

        let decoded = match self.decode(&raw) {
            Some(decoded) => decoded,
            None => return Probe::Corrupt,
        };

        let item: StorageItem<serde_json::Value> = match serde_json::from_str(&decoded) {
            Ok(item) => item,
            Err(_) => return Probe::Corrupt,
        };

        if item.is_expired() {
            self.evict(key).await;
            Probe::Evicted
        } else {
            Probe::Live
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::MockBackend;
    use crate::infrastructure::backend::MemoryBackend;

    fn manager(backend: Arc<dyn StorageBackend>, prefix: &str) -> StorageManager {
        StorageManager::new(backend, ManagerConfig::new(prefix))
    }

    #[tokio::test]
    async fn test_set_and_get_roundtrip() {
        let m = manager(Arc::new(MemoryBackend::new()), "ns_");

        assert!(m.set("theme", &"dark", None).await);

        let result: Option<String> = m.get("theme").await;
        assert_eq!(result, Some("dark".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let m = manager(Arc::new(MemoryBackend::new()), "ns_");

        let result: Option<String> = m.get("missing").await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_complex_value_roundtrip() {
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Profile {
            name: String,
            tags: Vec<String>,
        }

        let m = manager(Arc::new(MemoryBackend::new()), "ns_");
        let profile = Profile {
            name: "Amara".to_string(),
            tags: vec!["member".to_string(), "beta".to_string()],
        };

        assert!(m.set("profile", &profile, None).await);

        let result: Option<Profile> = m.get("profile").await;
        assert_eq!(result, Some(profile));
    }

    #[tokio::test]
    async fn test_expiry_after_ttl() {
        let m = manager(Arc::new(MemoryBackend::new()), "ns_");

        m.set("theme", &"dark", Some(Duration::from_millis(50))).await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        let result: Option<String> = m.get("theme").await;
        assert!(result.is_none());

        // The evicting read also drops the key from the listing
        assert!(m.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_theme_scenario() {
        let m = manager(Arc::new(MemoryBackend::new()), "ns_");

        m.set("theme", &"dark", Some(Duration::from_millis(1000))).await;

        tokio::time::sleep(Duration::from_millis(500)).await;
        let result: Option<String> = m.get("theme").await;
        assert_eq!(result, Some("dark".to_string()));

        tokio::time::sleep(Duration::from_millis(600)).await;
        let result: Option<String> = m.get("theme").await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_default_ttl_applies() {
        let config = ManagerConfig::new("ns_").with_default_ttl(Duration::from_millis(50));
        let m = StorageManager::new(Arc::new(MemoryBackend::new()), config);

        m.set("value", &1, None).await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        let result: Option<i32> = m.get("value").await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_explicit_ttl_overrides_default() {
        let config = ManagerConfig::new("ns_").with_default_ttl(Duration::from_millis(20));
        let m = StorageManager::new(Arc::new(MemoryBackend::new()), config);

        m.set("value", &1, Some(Duration::from_secs(60))).await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        let result: Option<i32> = m.get("value").await;
        assert_eq!(result, Some(1));
    }

    #[tokio::test]
    async fn test_remove_then_get() {
        let m = manager(Arc::new(MemoryBackend::new()), "ns_");

        m.set("key1", &"value1", Some(Duration::from_secs(60))).await;

        assert!(m.remove("key1").await);

        let result: Option<String> = m.get("key1").await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let m = manager(Arc::new(MemoryBackend::new()), "ns_");

        assert!(m.remove("never_set").await);
    }

    #[tokio::test]
    async fn test_clear_respects_namespace() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let ns1 = manager(backend.clone(), "ns1_");
        let ns2 = manager(backend.clone(), "ns2_");

        ns1.set("x", &1, None).await;
        ns2.set("x", &1, None).await;

        assert!(ns1.clear().await);

        assert!(ns1.keys().await.is_empty());
        let survivor: Option<i32> = ns2.get("x").await;
        assert_eq!(survivor, Some(1));
    }

    #[tokio::test]
    async fn test_has_evicts_expired() {
        let m = manager(Arc::new(MemoryBackend::new()), "ns_");

        m.set("key1", &"value1", Some(Duration::from_millis(30))).await;
        assert!(m.has("key1").await);

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(!m.has("key1").await);
        assert!(m.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_keys_include_expired_until_touched() {
        let m = manager(Arc::new(MemoryBackend::new()), "ns_");

        m.set("stale", &1, Some(Duration::from_millis(20))).await;
        m.set("fresh", &2, None).await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        // keys() does no TTL filtering
        let mut keys = m.keys().await;
        keys.sort();
        assert_eq!(keys, vec!["fresh".to_string(), "stale".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_entry_returns_none_without_removal() {
        let backend = Arc::new(MockBackend::new().with_entry("ns_bad", "{not json"));
        let m = manager(backend, "ns_");

        let result: Option<String> = m.get("bad").await;
        assert!(result.is_none());

        // Corruption is not this method's problem to clean up
        assert_eq!(m.keys().await, vec!["bad".to_string()]);
    }

    #[tokio::test]
    async fn test_cleanup_counts_expired_and_is_idempotent() {
        let m = manager(Arc::new(MemoryBackend::new()), "ns_");

        m.set("a", &1, Some(Duration::from_millis(20))).await;
        m.set("b", &2, Some(Duration::from_millis(20))).await;
        m.set("c", &3, None).await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(m.cleanup().await, 2);
        assert_eq!(m.cleanup().await, 0);

        assert_eq!(m.keys().await, vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn test_cleanup_ignores_corrupt_entries() {
        let backend = Arc::new(MockBackend::new().with_entry("ns_bad", "garbage"));
        let m = manager(backend, "ns_");

        m.set("stale", &1, Some(Duration::from_millis(20))).await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(m.cleanup().await, 1);
        // The corrupt entry is still there for the corruption sweep
        assert_eq!(m.keys().await, vec!["bad".to_string()]);
    }

    #[tokio::test]
    async fn test_cleanup_corrupted() {
        let backend = Arc::new(
            MockBackend::new()
                .with_entry("ns_bad1", "{not json")
                .with_entry("ns_bad2", "12 34"),
        );
        let m = manager(backend, "ns_");

        m.set("good", &"ok", None).await;

        assert_eq!(m.cleanup_corrupted().await, 2);
        assert_eq!(m.keys().await, vec!["good".to_string()]);
        assert_eq!(m.cleanup_corrupted().await, 0);
    }

    #[tokio::test]
    async fn test_size_sums_raw_lengths() {
        let backend = Arc::new(MockBackend::new());
        let m = manager(backend.clone(), "ns_");

        m.set("k", &1, None).await;

        let raw = backend.raw();
        let (key, value) = raw.iter().next().unwrap();
        assert_eq!(m.size().await, (key.len() + value.len()) as u64);
    }

    #[tokio::test]
    async fn test_size_excludes_other_namespaces() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let ns1 = manager(backend.clone(), "ns1_");
        let ns2 = manager(backend.clone(), "ns2_");

        ns2.set("huge", &"x".repeat(1_000), None).await;

        assert_eq!(ns1.size().await, 0);
        assert!(ns2.size().await > 1_000);
    }

    #[tokio::test]
    async fn test_encoding_roundtrip() {
        let backend = Arc::new(MockBackend::new());
        let config = ManagerConfig::new("ns_").with_encoding();
        let m = StorageManager::new(backend.clone(), config);

        m.set("secret", &"value", None).await;

        // Raw stored text is base64, not plain JSON
        let raw = backend.raw();
        let stored = raw.get("ns_secret").unwrap();
        assert!(!stored.starts_with('{'));

        let result: Option<String> = m.get("secret").await;
        assert_eq!(result, Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_backend_failure_degrades() {
        let backend = Arc::new(MockBackend::new().with_error("store disabled"));
        let m = manager(backend, "ns_");

        assert!(!m.set("key", &1, None).await);
        let result: Option<i32> = m.get("key").await;
        assert!(result.is_none());
        assert!(!m.remove("key").await);
        assert!(m.keys().await.is_empty());
        assert_eq!(m.size().await, 0);
        assert_eq!(m.cleanup().await, 0);
    }

    #[tokio::test]
    async fn test_events_emitted() {
        let (tx, mut rx) = broadcast::channel(16);
        let m = StorageManager::new(Arc::new(MemoryBackend::new()), ManagerConfig::new("ns_"))
            .with_events(tx);

        m.set("theme", &"dark", None).await;
        m.remove("theme").await;
        m.clear().await;

        assert_eq!(
            rx.recv().await.unwrap(),
            StorageEvent::Updated {
                key: "theme".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            StorageEvent::Removed {
                key: "theme".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            StorageEvent::Cleared {
                prefix: "ns_".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_lazy_eviction_emits_removed() {
        let (tx, mut rx) = broadcast::channel(16);
        let m = StorageManager::new(Arc::new(MemoryBackend::new()), ManagerConfig::new("ns_"))
            .with_events(tx);

        m.set("flash", &1, Some(Duration::from_millis(20))).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        let _: Option<i32> = m.get("flash").await;

        // Updated from the set, then Removed from the eviction
        let _ = rx.recv().await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            StorageEvent::Removed {
                key: "flash".to_string()
            }
        );
    }
}
