//! Stored Entry Module
//!
//! A single value held by the in-memory store, with its absolute expiry
//! and the access tick used for capacity eviction.

use std::time::{SystemTime, UNIX_EPOCH};

// == Stored Entry ==
/// Represents a single stored value with expiry metadata.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The serialized payload
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
    /// Logical clock value of the last read or write
    pub last_access: u64,
}

impl StoredEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_seconds` from now, or never.
    pub fn new(value: String, ttl_seconds: Option<u64>, tick: u64) -> Self {
        let expires_at = ttl_seconds
            .map(|ttl| current_timestamp_ms().saturating_add(ttl.saturating_mul(1000)));

        Self {
            value,
            expires_at,
            last_access: tick,
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiration
    /// time, so a TTL of `t` seconds is visible for strictly less than `t`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        matches!(self.expires_at, Some(expires) if now_ms >= expires)
    }

    // == Time To Live ==
    /// Remaining TTL in milliseconds, `Some(0)` once expired, `None` if persistent.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        let now = current_timestamp_ms();
        self.expires_at.map(|expires| expires.saturating_sub(now))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
