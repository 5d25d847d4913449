//! Cache Entry Module
//!
//! A stored value together with its expiry.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

// == Cache Entry ==
/// A single stored value and the instant it stops being visible.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl_seconds` from now, or never for `None`.
    pub fn new(value: Value, ttl_seconds: Option<u64>) -> Self {
        let expires_at = ttl_seconds.map(|ttl| {
            let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
            let delta = TimeDelta::try_seconds(ttl).unwrap_or(TimeDelta::MAX);
            Utc::now()
                .checked_add_signed(delta)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiry instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks expiry against an explicit instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }
}
