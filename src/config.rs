//! Configuration Module
//!
//! Handles loading server and cache configuration from environment variables.
//! Every value has a fixed fallback; out-of-range values are clamped rather
//! than rejected, so a bad override never stops the server from starting.

use std::env;
use std::time::Duration;

use crate::cache::{
    DEFAULT_LIST_TTL, DEFAULT_POST_TTL, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_TTL, MAX_RETRY_ATTEMPTS, MAX_RETRY_DELAY_MS, MAX_TTL,
};

/// Which key-value store backs the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// External Redis server
    Redis,
    /// In-process store, for local runs and tests
    Memory,
}

impl CacheBackend {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => CacheBackend::Memory,
            _ => CacheBackend::Redis,
        }
    }
}

/// Cache tunables, resolved once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL in seconds for keys without a more specific class
    pub default_ttl: u64,
    /// TTL in seconds for single-post keys
    pub entity_ttl: u64,
    /// TTL in seconds for list-page keys
    pub list_ttl: u64,
    /// Attempts per get/set before giving up
    pub max_retry_attempts: u32,
    /// Base backoff; the wait before retry `n` is `retry_delay * n`
    pub retry_delay: Duration,
    /// Periodically log a metrics snapshot
    pub monitoring_enabled: bool,
}

impl CacheConfig {
    /// Loads cache settings from the process environment.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_POST_TTL` - Single post TTL in seconds (default: 1800)
    /// - `CACHE_LIST_TTL` - List page TTL in seconds (default: 900)
    /// - `CACHE_RETRY_ATTEMPTS` - Attempts per operation (default: 3, max: 5)
    /// - `CACHE_RETRY_DELAY` - Base backoff in ms (default: 100, max: 1000)
    /// - `CACHE_MONITORING_ENABLED` - `true` to log metrics periodically
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let attempts = positive(&lookup, "CACHE_RETRY_ATTEMPTS")
            .unwrap_or(u64::from(DEFAULT_RETRY_ATTEMPTS))
            .min(u64::from(MAX_RETRY_ATTEMPTS)) as u32;

        let delay_ms = lookup("CACHE_RETRY_DELAY")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_DELAY_MS)
            .min(MAX_RETRY_DELAY_MS);

        Self {
            default_ttl: ttl(&lookup, "CACHE_TTL", DEFAULT_TTL),
            entity_ttl: ttl(&lookup, "CACHE_POST_TTL", DEFAULT_POST_TTL),
            list_ttl: ttl(&lookup, "CACHE_LIST_TTL", DEFAULT_LIST_TTL),
            max_retry_attempts: attempts,
            retry_delay: Duration::from_millis(delay_ms),
            monitoring_enabled: lookup("CACHE_MONITORING_ENABLED")
                .map(|v| v.trim() == "true")
                .unwrap_or(false),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            entity_ttl: DEFAULT_POST_TTL,
            list_ttl: DEFAULT_LIST_TTL,
            max_retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            monitoring_enabled: false,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Store backing the cache
    pub cache_backend: CacheBackend,
    /// Redis connection string
    pub redis_url: String,
    /// Upper bound for a single Redis command
    pub redis_command_timeout: Duration,
    /// Capacity of the in-memory backend
    pub max_entries: usize,
    /// Expired-entry sweep interval in seconds (memory backend)
    pub cleanup_interval: u64,
    /// Metrics log interval in seconds
    pub metrics_interval: u64,
    /// Cache tunables
    pub cache: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_URL` - Redis connection string (default: redis://127.0.0.1:6379)
    /// - `REDIS_COMMAND_TIMEOUT_MS` - Per-command timeout (default: 2000)
    /// - `MAX_ENTRIES` - Memory backend capacity (default: 10000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    /// - `METRICS_INTERVAL` - Metrics log frequency in seconds (default: 60)
    ///
    /// plus everything read by [`CacheConfig::from_env`].
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            server_port: parsed(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            cache_backend: lookup("CACHE_BACKEND")
                .map(|v| CacheBackend::parse(&v))
                .unwrap_or(defaults.cache_backend),
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            redis_command_timeout: positive(&lookup, "REDIS_COMMAND_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.redis_command_timeout),
            max_entries: positive(&lookup, "MAX_ENTRIES")
                .map(|v| v as usize)
                .unwrap_or(defaults.max_entries),
            cleanup_interval: positive(&lookup, "CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
            metrics_interval: positive(&lookup, "METRICS_INTERVAL")
                .unwrap_or(defaults.metrics_interval),
            cache: CacheConfig::from_lookup(&lookup),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_backend: CacheBackend::Redis,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            redis_command_timeout: Duration::from_millis(2000),
            max_entries: 10_000,
            cleanup_interval: 1,
            metrics_interval: 60,
            cache: CacheConfig::default(),
        }
    }
}

fn parsed<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

// Zero counts as unset.
fn positive<F>(lookup: &F, name: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    parsed::<F, u64>(lookup, name).filter(|v| *v > 0)
}

fn ttl<F>(lookup: &F, name: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    positive(lookup, name).unwrap_or(default).min(MAX_TTL)
}
