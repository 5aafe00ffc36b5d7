//! Key-value store abstraction
//!
//! The transport seam between [`CacheClient`](super::CacheClient) and a
//! concrete store. Implementations report every failure as a
//! [`CacheError`]; deciding whether to retry or absorb it is the client's job.

use async_trait::async_trait;

use crate::error::CacheResult;

/// Raw string-keyed, string-valued store with optional per-key expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key is absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value`, expiring after `ttl_secs` when given, otherwise never.
    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> CacheResult<()>;

    /// Removes a single key, returning how many keys were removed (0 or 1).
    async fn delete(&self, key: &str) -> CacheResult<u64>;

    /// Removes every listed key in one batch.
    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64>;

    /// Lists live keys matching a glob pattern (`*`, `?`, `[...]`).
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Removes every key in the logical database.
    async fn flush(&self) -> CacheResult<()>;

    /// Liveness probe; a healthy store answers `PONG`.
    async fn ping(&self) -> CacheResult<String>;
}
