//! Well-known logical storage keys
//!
//! A closed set of semantic keys layered over the generic manager. These are
//! naming conventions, not separate entities; every key's value remains
//! independent of the others.

/// Logical keys recognized by the application facade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKey {
    /// UI theme preference
    Theme,
    /// UI language preference
    Language,
    /// Session token for the signed-in user
    AuthToken,
    /// Profile of the signed-in user
    UserProfile,
    /// Whether onboarding has been completed
    OnboardingComplete,
    /// Cached API response, keyed by an arbitrary suffix
    ApiCache(String),
    /// Transient per-component state, keyed by component id
    ComponentState(String),
    /// In-progress form draft, keyed by form id
    FormDraft(String),
    /// Append-only analytics event list
    AnalyticsEvents,
}

impl StorageKey {
    /// The storage key string this logical key maps to
    pub fn as_key(&self) -> String {
        match self {
            Self::Theme => "theme".to_string(),
            Self::Language => "language".to_string(),
            Self::AuthToken => "auth_token".to_string(),
            Self::UserProfile => "user_profile".to_string(),
            Self::OnboardingComplete => "onboarding_complete".to_string(),
            Self::ApiCache(suffix) => format!("api_cache_{}", suffix),
            Self::ComponentState(id) => format!("component_{}", id),
            Self::FormDraft(id) => format!("form_draft_{}", id),
            Self::AnalyticsEvents => "analytics_events".to_string(),
        }
    }

    /// Whether this key belongs in the session-scoped store rather than the
    /// persistent one
    pub fn is_session_scoped(&self) -> bool {
        matches!(self, Self::ComponentState(_) | Self::FormDraft(_))
    }
}
