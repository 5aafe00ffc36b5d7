//! Cache Client Module
//!
//! Resilient, observable access to one key-value store. Reads and writes
//! are retried with linear backoff; every store-facing operation is
//! error-contained here, so callers only ever see optional values,
//! booleans or counts. The cache is an optimization and must never be the
//! reason a request fails.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, warn};

use crate::cache::{
    CacheMetrics, Codec, JsonCodec, KeyValueStore, MetricsSnapshot, RetryPolicy, PING_REPLY,
};
use crate::error::CacheResult;

// == Cache Client ==
/// Typed front end over a [`KeyValueStore`].
///
/// Clones share the store connection and the metrics counters.
pub struct CacheClient<C = JsonCodec> {
    store: Arc<dyn KeyValueStore>,
    retry: RetryPolicy,
    metrics: Arc<CacheMetrics>,
    codec: Arc<C>,
}

impl<C> Clone for CacheClient<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            retry: self.retry,
            metrics: Arc::clone(&self.metrics),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl CacheClient<JsonCodec> {
    /// Creates a JSON client with fresh metrics.
    pub fn new(store: Arc<dyn KeyValueStore>, retry: RetryPolicy) -> Self {
        Self::with_codec(store, retry, JsonCodec)
    }
}

impl<C: Codec> CacheClient<C> {
    pub fn with_codec(store: Arc<dyn KeyValueStore>, retry: RetryPolicy, codec: C) -> Self {
        Self {
            store,
            retry,
            metrics: Arc::new(CacheMetrics::new()),
            codec: Arc::new(codec),
        }
    }

    // == Get ==
    /// Reads and decodes `key`, reporting a failure once retries run out.
    ///
    /// Every failed attempt (transport or decoding) counts one error.
    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let store = &self.store;
        let codec = &self.codec;

        let found = self
            .with_retry("get", key, move || async move {
                match store.get(key).await? {
                    Some(raw) => codec.decode::<T>(&raw).map(Some),
                    None => Ok(None),
                }
            })
            .await?;

        if found.is_some() {
            self.metrics.record_hit();
            debug!("Cache hit for key: {}", key);
        } else {
            self.metrics.record_miss();
            debug!("Cache miss for key: {}", key);
        }

        Ok(found)
    }

    /// Reads and decodes `key`. Absent, expired, undecodable and
    /// unreachable all come back as `None`; only the error counter tells
    /// them apart.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.try_get(key).await.ok().flatten()
    }

    // == Set ==
    /// Encodes and stores `value`. A `ttl` of `None` or zero stores
    /// without expiry.
    pub async fn try_set<T>(&self, key: &str, value: &T, ttl: Option<u64>) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
    {
        let raw = self.codec.encode(value).inspect_err(|e| {
            self.metrics.record_error();
            warn!("Cache encode error for key {}: {}", key, e);
        })?;

        let ttl = ttl.filter(|secs| *secs > 0);
        let store = &self.store;
        let raw = raw.as_str();

        self.with_retry("set", key, move || async move {
            store.set(key, raw.to_string(), ttl).await
        })
        .await?;

        debug!("Cache set for key: {}", key);
        Ok(())
    }

    /// Stores `value`, returning `false` once retries are exhausted.
    pub async fn set<T>(&self, key: &str, value: &T, ttl: Option<u64>) -> bool
    where
        T: Serialize + ?Sized,
    {
        self.try_set(key, value, ttl).await.is_ok()
    }

    // == Delete ==
    /// Removes one key in a single attempt; 0 when absent or on failure.
    pub async fn delete(&self, key: &str) -> u64 {
        match self.store.delete(key).await {
            Ok(removed) => {
                debug!("Cache deleted for key: {}", key);
                removed
            }
            Err(e) => {
                self.metrics.record_error();
                error!("Cache delete error for key {}: {}", key, e);
                0
            }
        }
    }

    /// Removes every key matching a glob pattern in one batch.
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        let outcome: CacheResult<u64> = async {
            let keys = self.store.keys(pattern).await?;
            if keys.is_empty() {
                return Ok(0);
            }
            self.store.delete_many(&keys).await
        }
        .await;

        match outcome {
            Ok(removed) => {
                if removed > 0 {
                    debug!("Cache deleted {} keys for pattern: {}", removed, pattern);
                }
                removed
            }
            Err(e) => {
                self.metrics.record_error();
                error!("Cache delete by pattern error for {}: {}", pattern, e);
                0
            }
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.store.exists(key).await.unwrap_or_else(|e| {
            self.metrics.record_error();
            error!("Cache exists error for key {}: {}", key, e);
            false
        })
    }

    /// Drops every key in the store. Maintenance and tests only.
    pub async fn flush_all(&self) -> bool {
        match self.store.flush().await {
            Ok(()) => {
                info!("Cache store flushed");
                true
            }
            Err(e) => {
                self.metrics.record_error();
                error!("Cache flush error: {}", e);
                false
            }
        }
    }

    /// True only if the store answers `PONG`.
    pub async fn ping(&self) -> bool {
        match self.store.ping().await {
            Ok(reply) => reply == PING_REPLY,
            Err(e) => {
                error!("Cache ping failed: {}", e);
                false
            }
        }
    }

    // == Metrics ==
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    // Runs `attempt_fn` until it succeeds or the policy is exhausted,
    // sleeping `base_delay * n` after failed attempt `n`. Non-transient
    // errors end the loop on the first attempt.
    async fn with_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        key: &str,
        mut attempt_fn: F,
    ) -> CacheResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CacheResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match attempt_fn().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    self.metrics.record_error();

                    if !e.is_transient() {
                        error!("Cache {} for key {} rejected: {}", operation, key, e);
                        return Err(e);
                    }

                    if self.retry.is_last(attempt) {
                        error!(
                            "Cache {} for key {} failed after {} attempts: {}",
                            operation, key, attempt, e
                        );
                        return Err(e);
                    }

                    warn!(
                        "Cache {} error for key {} (attempt {}): {}",
                        operation, key, attempt, e
                    );
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}
