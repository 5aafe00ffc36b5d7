//! Cache Module
//!
//! Cache-aside layer in front of the post repository: a resilient
//! key-value client with retry/backoff and metrics, the stores it can talk
//! to, and the entity-aware orchestration built on top of it.

mod backend;
mod client;
mod codec;
mod entity;
mod entry;
mod keys;
mod memory;
mod metrics;
mod redis_store;
mod retry;


// Re-export public types
pub use backend::KeyValueStore;
pub use client::CacheClient;
pub use codec::{Codec, JsonCodec};
pub use entity::{EntityCache, TtlClass};
pub use entry::StoredEntry;
pub use keys::KeySpace;
pub use memory::MemoryStore;
pub use metrics::{CacheMetrics, MetricsSnapshot};
pub use redis_store::RedisStore;
pub use retry::RetryPolicy;

// == TTL Defaults (seconds) ==
pub const DEFAULT_TTL: u64 = 3600;
pub const DEFAULT_POST_TTL: u64 = 1800;
pub const DEFAULT_LIST_TTL: u64 = 900;

// == Retry Defaults ==
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;
pub const MAX_RETRY_ATTEMPTS: u32 = 5;
pub const MAX_RETRY_DELAY_MS: u64 = 1000;

// == Store Limits ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 512;

/// Maximum allowed value size in bytes, Redis's bulk string limit
pub const MAX_VALUE_SIZE: usize = 512 * 1024 * 1024; // 512 MB

/// Longest TTL in seconds; keeps the expiry representable in milliseconds
/// and as a Redis `SET EX` argument
pub const MAX_TTL: u64 = i64::MAX as u64 / 1000;

/// Reply expected from a healthy store on PING
pub const PING_REPLY: &str = "PONG";
