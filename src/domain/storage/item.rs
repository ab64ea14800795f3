//! Stored entry envelope

use serde::{Deserialize, Serialize};

/// Envelope written around every stored value
///
/// `timestamp` is set at write time. The item is logically expired once
/// `now - timestamp > ttl_ms`, if a TTL is present; items without a TTL
/// never expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageItem<T> {
    pub value: T,
    /// Write time, millis since epoch
    pub timestamp: u64,
    /// Time-to-live in millis, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_ms: Option<u64>,
}

impl<T> StorageItem<T> {
    /// Creates an envelope stamped with the current time
    pub fn new(value: T, ttl_ms: Option<u64>) -> Self {
        Self {
            value,
            timestamp: now_millis(),
            ttl_ms,
        }
    }

    /// Whether the item has outlived its TTL as of `now` (millis since epoch)
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.ttl_ms {
            Some(ttl) => now.saturating_sub(self.timestamp) > ttl,
            None => false,
        }
    }

    /// Whether the item has outlived its TTL
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }
}

/// Current time in millis since the Unix epoch
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stamps_current_time() {
        let before = now_millis();
        let item = StorageItem::new("value", None);
        let after = now_millis();

        assert!(item.timestamp >= before && item.timestamp <= after);
        assert_eq!(item.ttl_ms, None);
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let item = StorageItem::new(42, None);
        assert!(!item.is_expired_at(item.timestamp + u64::MAX / 2));
    }

    #[test]
    fn test_expired_after_ttl() {
        let item = StorageItem::new(42, Some(1_000));

        assert!(!item.is_expired_at(item.timestamp + 1_000));
        assert!(item.is_expired_at(item.timestamp + 1_001));
    }

    #[test]
    fn test_roundtrip_without_ttl_omits_field() {
        let item = StorageItem::new("dark", None);
        let json = serde_json::to_string(&item).unwrap();

        assert!(!json.contains("ttl_ms"));

        let parsed: StorageItem<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.value, "dark");
        assert_eq!(parsed.ttl_ms, None);
    }
}
