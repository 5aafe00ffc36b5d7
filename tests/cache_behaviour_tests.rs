//! Integration Tests for Cache Behaviour
//!
//! Cache-aside semantics through the public crate API: hits skip the
//! factory, failures are contained, invalidation is scoped and idempotent.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blog_cache::cache::{
    CacheClient, EntityCache, KeySpace, KeyValueStore, MemoryStore, RetryPolicy, TtlClass,
};
use blog_cache::error::{CacheError, CacheResult};
use blog_cache::CacheConfig;
use serde::{Deserialize, Serialize};
use tokio_test::{assert_err, assert_ok};

// == Helpers ==

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Item {
    title: String,
}

fn item(title: &str) -> Item {
    Item {
        title: title.to_string(),
    }
}

fn post_cache(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> EntityCache {
    let client = CacheClient::new(store, RetryPolicy::from_config(&config));
    EntityCache::new(client, KeySpace::new("post"), config)
}

fn memory_cache() -> (EntityCache, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new(1000));
    (post_cache(store.clone(), CacheConfig::default()), store)
}

/// A store that is down: every command fails.
#[derive(Default)]
struct DownStore {
    gets: AtomicU32,
    sets: AtomicU32,
}

impl DownStore {
    fn refuse<T>(&self) -> CacheResult<T> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for DownStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.refuse()
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Option<u64>) -> CacheResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.refuse()
    }

    async fn delete(&self, _key: &str) -> CacheResult<u64> {
        self.refuse()
    }

    async fn delete_many(&self, _keys: &[String]) -> CacheResult<u64> {
        self.refuse()
    }

    async fn keys(&self, _pattern: &str) -> CacheResult<Vec<String>> {
        self.refuse()
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        self.refuse()
    }

    async fn flush(&self) -> CacheResult<()> {
        self.refuse()
    }

    async fn ping(&self) -> CacheResult<String> {
        self.refuse()
    }
}

/// Healthy memory store except that reads of one key always fail.
struct OneBadKeyStore {
    inner: MemoryStore,
    bad_key: &'static str,
}

#[async_trait]
impl KeyValueStore for OneBadKeyStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        if key == self.bad_key {
            return Err(CacheError::Timeout);
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Option<u64>) -> CacheResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        self.inner.delete(key).await
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        self.inner.delete_many(keys).await
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        self.inner.keys(pattern).await
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.inner.exists(key).await
    }

    async fn flush(&self) -> CacheResult<()> {
        self.inner.flush().await
    }

    async fn ping(&self) -> CacheResult<String> {
        self.inner.ping().await
    }
}

fn fast_retry_config(attempts: u32) -> CacheConfig {
    CacheConfig {
        max_retry_attempts: attempts,
        retry_delay: Duration::from_millis(5),
        ..CacheConfig::default()
    }
}

// == Get Or Compute ==

#[tokio::test]
async fn test_hit_skips_factory() {
    let (cache, _) = memory_cache();
    assert!(cache.set_entity("abc", &item("T")).await);
    let calls = AtomicU32::new(0);

    let value = cache
        .get_or_compute_entity("abc", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(item("fresh"))
        })
        .await;

    assert_eq!(assert_ok!(value), item("T"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_miss_runs_factory_once_then_caches() {
    let (cache, _) = memory_cache();
    let calls = AtomicU32::new(0);

    for _ in 0..3 {
        let value = cache
            .get_or_compute_entity("abc", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(item("T"))
            })
            .await;
        assert_eq!(assert_ok!(value), item("T"));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.get_entity::<Item>("abc").await, Some(item("T")));

    let metrics = cache.client().metrics();
    assert_eq!(metrics.misses, 1);
    // two from the loop, one from the direct read
    assert_eq!(metrics.hits, 3);
}

#[tokio::test]
async fn test_factory_error_propagates_and_nothing_is_cached() {
    let (cache, store) = memory_cache();

    let result: Result<Item, String> = cache
        .get_or_compute_entity("abc", || async { Err("repository down".to_string()) })
        .await;

    assert_eq!(assert_err!(result), "repository down");
    assert!(!assert_ok!(store.exists("post:abc").await));
}

#[tokio::test]
async fn test_store_outage_falls_through_to_factory() {
    let store = Arc::new(DownStore::default());
    let cache = post_cache(store.clone(), fast_retry_config(2));

    let value = cache
        .get_or_compute("post:abc", TtlClass::Entity, || async {
            Ok::<_, String>(item("T"))
        })
        .await;

    assert_eq!(assert_ok!(value), item("T"));
    assert_eq!(store.gets.load(Ordering::SeqCst), 2);
    assert_eq!(store.sets.load(Ordering::SeqCst), 2);
    assert_eq!(cache.client().metrics().errors, 4);
}

// == Retry ==

#[tokio::test]
async fn test_retry_exhaustion_contains_failures() {
    let store = Arc::new(DownStore::default());
    let client = CacheClient::new(store.clone(), RetryPolicy::new(3, Duration::from_millis(5)));

    assert_eq!(client.get::<Item>("post:abc").await, None);
    assert_eq!(store.gets.load(Ordering::SeqCst), 3);
    assert_eq!(client.metrics().errors, 3);

    assert!(!client.set("post:abc", &item("T"), Some(60)).await);
    assert_eq!(store.sets.load(Ordering::SeqCst), 3);
    assert_eq!(client.metrics().errors, 6);

    assert_err!(client.try_get::<Item>("post:abc").await);
    assert_eq!(client.metrics().hits + client.metrics().misses, 0);
}

#[tokio::test]
async fn test_backoff_does_not_block_other_calls() {
    let store = Arc::new(OneBadKeyStore {
        inner: MemoryStore::new(10),
        bad_key: "post:broken",
    });
    let client = CacheClient::new(store, RetryPolicy::new(3, Duration::from_millis(100)));
    assert!(client.set("post:abc", &item("T"), None).await);

    let started = tokio::time::Instant::now();
    let (broken, (healthy, healthy_elapsed)) = tokio::join!(
        client.get::<Item>("post:broken"),
        async {
            let value = client.get::<Item>("post:abc").await;
            (value, started.elapsed())
        }
    );

    // the broken read sleeps 100ms + 200ms between its attempts
    assert_eq!(broken, None);
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(healthy, Some(item("T")));
    assert!(healthy_elapsed < Duration::from_millis(100));
    assert_eq!(client.metrics().errors, 3);
}

#[tokio::test]
async fn test_single_attempt_operations_on_outage() {
    let store = Arc::new(DownStore::default());
    let client = CacheClient::new(store, RetryPolicy::no_retry());

    assert_eq!(client.delete("post:abc").await, 0);
    assert_eq!(client.delete_pattern("post:*").await, 0);
    assert!(!client.exists("post:abc").await);
    assert!(!client.ping().await);
    assert_eq!(client.metrics().errors, 3);
}

// == TTL ==

#[tokio::test]
async fn test_entity_expires_after_ttl() {
    let store = Arc::new(MemoryStore::new(100));
    let config = CacheConfig {
        entity_ttl: 1,
        ..CacheConfig::default()
    };
    let cache = post_cache(store, config);

    assert!(cache.set_entity("abc", &item("T")).await);
    assert_eq!(cache.get_entity::<Item>("abc").await, Some(item("T")));

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(cache.get_entity::<Item>("abc").await, None);
}

// == Invalidation ==

#[tokio::test]
async fn test_list_invalidation_reaches_every_page_size() {
    let (cache, store) = memory_cache();
    cache.set_entity("abc", &item("T")).await;
    for (page, size) in [(1, 10), (2, 10), (1, 20)] {
        cache.set_list_page(page, size, &vec![item("T")]).await;
    }

    assert_eq!(cache.invalidate_list_pages().await, 3);

    for (page, size) in [(1, 10), (2, 10), (1, 20)] {
        assert_eq!(cache.get_list_page::<Vec<Item>>(page, size).await, None);
    }
    assert!(assert_ok!(store.exists("post:abc").await));
}

#[tokio::test]
async fn test_invalidation_is_idempotent() {
    let (cache, _) = memory_cache();
    cache.set_entity("abc", &item("T")).await;
    cache.set_list_page(1, 10, &vec![item("T")]).await;

    assert_eq!(cache.invalidate_entity("abc").await, 1);
    assert_eq!(cache.invalidate_entity("abc").await, 0);
    assert_eq!(cache.invalidate_list_pages().await, 1);
    assert_eq!(cache.invalidate_list_pages().await, 0);
    assert_eq!(cache.invalidate_all().await, 0);
    assert_eq!(cache.client().metrics().errors, 0);
}

#[tokio::test]
async fn test_read_invalidate_read_scenario() {
    let (cache, _) = memory_cache();
    let calls = AtomicU32::new(0);
    let load = || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(item("T"))
    };

    assert_ok!(cache.get_or_compute_entity("abc", load).await);
    assert_ok!(cache.get_or_compute_entity("abc", load).await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    cache.invalidate_entity("abc").await;

    assert_ok!(cache.get_or_compute_entity("abc", load).await);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
