//! Analytics event records
//!
//! Events are stored as a single serialized array value under one key, in
//! append order. The log is unbounded unless explicitly cleared. Appending
//! is a read-modify-write over the whole array, so two concurrent writers
//! sharing the same persistent store can lose updates; this is a known
//! limitation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single tracked event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsEvent {
    /// Event name, e.g. "page_view"
    pub name: String,
    /// Arbitrary event payload
    #[serde(default)]
    pub properties: serde_json::Value,
    /// Injected at append time
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    /// Creates an event stamped with the current time
    pub fn new(name: impl Into<String>, properties: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            properties,
            timestamp: Utc::now(),
        }
    }
}
