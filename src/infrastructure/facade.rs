//! Application storage facade
//!
//! Convenience layer composing the two storage managers (persistent and
//! session-scoped) for specific application concerns: preferences, the auth
//! token, cached API responses, transient component state and the analytics
//! event log. Pure composition over [`StorageManager`]; the only state of
//! its own is the enabled flag the lifecycle service flips when the probe
//! fails, after which every operation is a no-op returning its safe default.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;

use crate::domain::{
    AnalyticsEvent, AuthUser, SessionToken, StorageBackend, StorageEvent, StorageKey,
};

use super::manager::{ManagerConfig, StorageManager};

/// Auth tokens are kept for one hour
pub const AUTH_TOKEN_TTL: Duration = Duration::from_secs(3600);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Facade configuration
#[derive(Debug, Clone)]
pub struct FacadeConfig {
    /// Prefix for the persistent namespace
    pub persistent_prefix: String,
    /// Prefix for the session-scoped namespace
    pub session_prefix: String,
    /// Whether stored envelopes are base64-encoded
    pub encode: bool,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            persistent_prefix: "asante_".to_string(),
            session_prefix: "asante_session_".to_string(),
            encode: false,
        }
    }
}

/// Typed key-value service over the two application stores
#[derive(Debug)]
pub struct AppStorage {
    persistent: StorageManager,
    session: StorageManager,
    events: broadcast::Sender<StorageEvent>,
    enabled: AtomicBool,
}

impl AppStorage {
    /// Creates the facade over the given backends
    pub fn new(
        persistent_backend: Arc<dyn StorageBackend>,
        session_backend: Arc<dyn StorageBackend>,
        config: FacadeConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let mut persistent_config = ManagerConfig::new(&config.persistent_prefix);
        let mut session_config = ManagerConfig::new(&config.session_prefix);

        if config.encode {
            persistent_config = persistent_config.with_encoding();
            session_config = session_config.with_encoding();
        }

        Self {
            persistent: StorageManager::new(persistent_backend, persistent_config)
                .with_events(events.clone()),
            session: StorageManager::new(session_backend, session_config)
                .with_events(events.clone()),
            events,
            enabled: AtomicBool::new(true),
        }
    }

    /// Subscribes to change notifications from both namespaces
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    /// Whether operations are currently honored
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Enables or disables all operations; set by the lifecycle service
    /// after probing backend availability
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn manager_for(&self, key: &StorageKey) -> &StorageManager {
        if key.is_session_scoped() {
            &self.session
        } else {
            &self.persistent
        }
    }

    /// Generic registry write
    pub async fn set<T: Serialize>(
        &self,
        key: &StorageKey,
        value: &T,
        ttl: Option<Duration>,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.manager_for(key).set(&key.as_key(), value, ttl).await
    }

    /// Generic registry read
    pub async fn get<T: DeserializeOwned>(&self, key: &StorageKey) -> Option<T> {
        if !self.is_enabled() {
            return None;
        }
        self.manager_for(key).get(&key.as_key()).await
    }

    /// Generic registry removal
    pub async fn remove(&self, key: &StorageKey) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.manager_for(key).remove(&key.as_key()).await
    }

    // Preferences

    pub async fn set_theme(&self, theme: &str) -> bool {
        self.set(&StorageKey::Theme, &theme, None).await
    }

    pub async fn theme(&self) -> Option<String> {
        self.get(&StorageKey::Theme).await
    }

    pub async fn set_language(&self, language: &str) -> bool {
        self.set(&StorageKey::Language, &language, None).await
    }

    pub async fn language(&self) -> Option<String> {
        self.get(&StorageKey::Language).await
    }

    pub async fn set_onboarding_complete(&self, complete: bool) -> bool {
        self.set(&StorageKey::OnboardingComplete, &complete, None)
            .await
    }

    pub async fn onboarding_complete(&self) -> bool {
        self.get(&StorageKey::OnboardingComplete)
            .await
            .unwrap_or(false)
    }

    // Auth

    /// Stores the session token with the fixed one-hour TTL
    pub async fn set_auth_token(&self, token: &SessionToken) -> bool {
        self.set(&StorageKey::AuthToken, token, Some(AUTH_TOKEN_TTL))
            .await
    }

    pub async fn auth_token(&self) -> Option<SessionToken> {
        self.get(&StorageKey::AuthToken).await
    }

    pub async fn clear_auth_token(&self) -> bool {
        self.remove(&StorageKey::AuthToken).await
    }

    pub async fn set_user_profile(&self, user: &AuthUser) -> bool {
        self.set(&StorageKey::UserProfile, user, None).await
    }

    pub async fn user_profile(&self) -> Option<AuthUser> {
        self.get(&StorageKey::UserProfile).await
    }

    pub async fn clear_user_profile(&self) -> bool {
        self.remove(&StorageKey::UserProfile).await
    }

    // API response cache

    /// Caches an API response under an arbitrary suffix
    pub async fn cache_api_response<T: Serialize>(
        &self,
        suffix: &str,
        value: &T,
        ttl: Duration,
    ) -> bool {
        self.set(
            &StorageKey::ApiCache(suffix.to_string()),
            value,
            Some(ttl),
        )
        .await
    }

    pub async fn cached_api_response<T: DeserializeOwned>(&self, suffix: &str) -> Option<T> {
        self.get(&StorageKey::ApiCache(suffix.to_string())).await
    }

    // Transient state (session-scoped)

    pub async fn set_component_state<T: Serialize>(&self, component: &str, state: &T) -> bool {
        self.set(&StorageKey::ComponentState(component.to_string()), state, None)
            .await
    }

    pub async fn component_state<T: DeserializeOwned>(&self, component: &str) -> Option<T> {
        self.get(&StorageKey::ComponentState(component.to_string()))
            .await
    }

    pub async fn set_form_draft<T: Serialize>(&self, form: &str, draft: &T) -> bool {
        self.set(&StorageKey::FormDraft(form.to_string()), draft, None)
            .await
    }

    pub async fn form_draft<T: DeserializeOwned>(&self, form: &str) -> Option<T> {
        self.get(&StorageKey::FormDraft(form.to_string())).await
    }

    // Analytics

    /// Appends an event to the analytics log, injecting the timestamp
    ///
    /// Read-modify-write over the whole array; concurrent writers sharing
    /// the persistent store can lose updates (known limitation).
    pub async fn track(&self, name: &str, properties: serde_json::Value) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let mut events: Vec<AnalyticsEvent> = self
            .get(&StorageKey::AnalyticsEvents)
            .await
            .unwrap_or_default();

        events.push(AnalyticsEvent::new(name, properties));

        self.set(&StorageKey::AnalyticsEvents, &events, None).await
    }

    /// The analytics log, in append order
    pub async fn analytics_events(&self) -> Vec<AnalyticsEvent> {
        self.get(&StorageKey::AnalyticsEvents)
            .await
            .unwrap_or_default()
    }

    pub async fn clear_analytics_events(&self) -> bool {
        self.remove(&StorageKey::AnalyticsEvents).await
    }

    // Maintenance

    /// Evicts expired entries across both namespaces
    pub async fn cleanup(&self) -> usize {
        if !self.is_enabled() {
            return 0;
        }
        self.persistent.cleanup().await + self.session.cleanup().await
    }

    /// Removes unparseable entries across both namespaces
    pub async fn cleanup_corrupted(&self) -> usize {
        if !self.is_enabled() {
            return 0;
        }
        self.persistent.cleanup_corrupted().await + self.session.cleanup_corrupted().await
    }

    /// Combined approximate footprint of both namespaces
    pub async fn approx_size(&self) -> u64 {
        if !self.is_enabled() {
            return 0;
        }
        self.persistent.size().await + self.session.size().await
    }

    /// Clears both namespaces
    pub async fn clear_all(&self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let persistent_ok = self.persistent.clear().await;
        let session_ok = self.session.clear().await;
        persistent_ok && session_ok
    }

    /// The persistent-namespace manager
    pub fn persistent(&self) -> &StorageManager {
        &self.persistent
    }

    /// The session-namespace manager
    pub fn session(&self) -> &StorageManager {
        &self.session
    }
}
