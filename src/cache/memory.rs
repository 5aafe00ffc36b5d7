//! Memory Store Module
//!
//! In-process [`KeyValueStore`] with Redis-compatible semantics for the
//! subset of commands the cache client uses: absolute TTL expiry, glob
//! key listing and capacity-bounded eviction of the least recently
//! accessed entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use glob::Pattern;
use tokio::sync::RwLock;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{KeyValueStore, StoredEntry, MAX_KEY_LENGTH, MAX_VALUE_SIZE, PING_REPLY};
use crate::error::{CacheError, CacheResult};

// == Memory Store ==
/// Thread-safe in-memory store.
#[derive(Debug)]
pub struct MemoryStore {
    /// Key-value storage
    entries: RwLock<HashMap<String, StoredEntry>>,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Logical access clock for eviction ordering
    clock: AtomicU64,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
            clock: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remaining TTL of a live key in milliseconds (`None` if absent or persistent).
    pub async fn ttl_remaining_ms(&self, key: &str) -> Option<u64> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(StoredEntry::ttl_remaining_ms)
    }

    fn validate(key: &str, value: &str) -> CacheResult<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }
        Ok(())
    }

    // Makes room for one new key. Expired entries go first, then the least
    // recently accessed live one.
    fn make_room(&self, entries: &mut HashMap<String, StoredEntry>) -> CacheResult<()> {
        if entries.len() < self.max_entries {
            return Ok(());
        }

        let now = current_timestamp_ms();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        if entries.len() < self.max_entries {
            return Ok(());
        }

        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());

        match oldest {
            Some(key) => {
                entries.remove(&key);
                Ok(())
            }
            None => Err(CacheError::CacheFull(
                "Store has no capacity and nothing to evict".to_string(),
            )),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let tick = self.tick();
        let mut entries = self.entries.write().await;

        match entries.get_mut(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired() => {
                entry.last_access = tick;
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {}
        }

        entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> CacheResult<()> {
        Self::validate(key, &value)?;

        let tick = self.tick();
        let mut entries = self.entries.write().await;

        if !entries.contains_key(key) {
            self.make_room(&mut entries)?;
        }

        entries.insert(key.to_string(), StoredEntry::new(value, ttl_secs, tick));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        let mut entries = self.entries.write().await;
        Ok(match entries.remove(key) {
            Some(entry) if !entry.is_expired() => 1,
            _ => 0,
        })
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;

        let removed = keys
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|entry| !entry.is_expired_at(now))
            .count();

        Ok(removed as u64)
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let matcher =
            Pattern::new(pattern).map_err(|e| CacheError::InvalidPattern(e.to_string()))?;
        let now = current_timestamp_ms();
        let entries = self.entries.read().await;

        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired_at(now) && matcher.matches(key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();

        Ok(keys)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).is_some_and(|entry| !entry.is_expired()))
    }

    async fn flush(&self) -> CacheResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn ping(&self) -> CacheResult<String> {
        Ok(PING_REPLY.to_string())
    }
}
