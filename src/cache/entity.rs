//! Entity Cache Module
//!
//! Cache-aside policy for one entity type: key construction, TTL per kind
//! of object and the get-or-compute idiom every read flows through.
//!
//! Concurrent misses on the same key may both run their factory and both
//! write the result; the last write wins. Factories must therefore be
//! idempotent with respect to caching.

use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheClient, Codec, JsonCodec, KeySpace};
use crate::config::CacheConfig;

/// Which configured TTL applies to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    Default,
    Entity,
    List,
}

// == Entity Cache ==
pub struct EntityCache<C = JsonCodec> {
    client: CacheClient<C>,
    keys: KeySpace,
    config: CacheConfig,
}

impl<C> Clone for EntityCache<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            keys: self.keys.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C: Codec> EntityCache<C> {
    pub fn new(client: CacheClient<C>, keys: KeySpace, config: CacheConfig) -> Self {
        Self {
            client,
            keys,
            config,
        }
    }

    pub fn client(&self) -> &CacheClient<C> {
        &self.client
    }

    pub fn ttl_for(&self, class: TtlClass) -> u64 {
        match class {
            TtlClass::Default => self.config.default_ttl,
            TtlClass::Entity => self.config.entity_ttl,
            TtlClass::List => self.config.list_ttl,
        }
    }

    // == Single Entity ==
    pub async fn get_entity<T: DeserializeOwned>(&self, id: &str) -> Option<T> {
        self.client.get(&self.keys.entity_key(id)).await
    }

    pub async fn set_entity<T: Serialize>(&self, id: &str, value: &T) -> bool {
        let ttl = self.ttl_for(TtlClass::Entity);
        self.client
            .set(&self.keys.entity_key(id), value, Some(ttl))
            .await
    }

    // == List Pages ==
    pub async fn get_list_page<T: DeserializeOwned>(&self, page: u32, page_size: u32) -> Option<T> {
        self.client
            .get(&self.keys.list_key(page, page_size))
            .await
    }

    pub async fn set_list_page<T: Serialize>(&self, page: u32, page_size: u32, value: &T) -> bool {
        let ttl = self.ttl_for(TtlClass::List);
        self.client
            .set(&self.keys.list_key(page, page_size), value, Some(ttl))
            .await
    }

    // == Invalidation ==
    /// Drops the cached entity, returning how many keys were removed.
    pub async fn invalidate_entity(&self, id: &str) -> u64 {
        let removed = self.client.delete(&self.keys.entity_key(id)).await;
        if removed > 0 {
            debug!("Invalidated {} cache for ID: {}", self.keys.namespace(), id);
        }
        removed
    }

    /// Drops every cached list page, whatever its page size.
    pub async fn invalidate_list_pages(&self) -> u64 {
        let removed = self.client.delete_pattern(&self.keys.list_pattern()).await;
        if removed > 0 {
            debug!(
                "Invalidated {} {} list cache entries",
                removed,
                self.keys.namespace()
            );
        }
        removed
    }

    /// Drops every single-entity key and every list page.
    pub async fn invalidate_all(&self) -> u64 {
        let mut removed = 0;
        for pattern in [self.keys.entity_pattern(), self.keys.list_pattern()] {
            removed += self.client.delete_pattern(&pattern).await;
        }

        if removed > 0 {
            debug!("Invalidated {} total cache entries", removed);
        }
        removed
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key`, or runs `factory` exactly once,
    /// caches its result with the TTL of `class` and returns it.
    ///
    /// A factory error is returned unchanged and nothing is cached. A
    /// failed write-back is logged and ignored.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        class: TtlClass,
        factory: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.client.get::<T>(key).await {
            return Ok(cached);
        }

        let value = match factory().await {
            Ok(value) => value,
            Err(e) => {
                debug!("Factory failed for key {}, nothing cached", key);
                return Err(e);
            }
        };

        if !self.client.set(key, &value, Some(self.ttl_for(class))).await {
            warn!("Computed value for key {} was not cached", key);
        }

        Ok(value)
    }

    pub async fn get_or_compute_entity<T, E, F, Fut>(&self, id: &str, factory: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = self.keys.entity_key(id);
        self.get_or_compute(&key, TtlClass::Entity, factory).await
    }

    pub async fn get_or_compute_list<T, E, F, Fut>(
        &self,
        page: u32,
        page_size: u32,
        factory: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = self.keys.list_key(page, page_size);
        self.get_or_compute(&key, TtlClass::List, factory).await
    }
}
