//! Redis Store Module
//!
//! [`KeyValueStore`] backed by a Redis server. The multiplexed connection
//! is opened lazily and discarded after a failed command, so the next
//! attempt reconnects instead of reusing a broken socket.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::KeyValueStore;
use crate::error::{CacheError, CacheResult};

// == Redis Store ==
pub struct RedisStore {
    client: Client,
    connection: RwLock<Option<MultiplexedConnection>>,
    command_timeout: Duration,
}

impl Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connection_status = match self.connection.try_read() {
            Ok(conn) if conn.is_some() => "connected",
            Ok(_) => "no_connection",
            Err(_) => "lock_busy",
        };

        f.debug_struct("RedisStore")
            .field("command_timeout", &self.command_timeout)
            .field("connection", &connection_status)
            .finish()
    }
}

impl RedisStore {
    /// Creates a store for `redis_url`. No connection is made until the
    /// first command, so an unreachable server does not fail startup.
    pub fn new(redis_url: &str, command_timeout: Duration) -> CacheResult<Self> {
        let client = Client::open(redis_url)?;

        Ok(Self {
            client,
            connection: RwLock::new(None),
            command_timeout,
        })
    }

    async fn connection(&self) -> CacheResult<MultiplexedConnection> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let mut slot = self.connection.write().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = tokio::time::timeout(
            self.command_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| CacheError::Timeout)??;

        debug!("Redis connection established");
        *slot = Some(conn.clone());
        Ok(conn)
    }

    async fn reset_connection(&self) {
        self.connection.write().await.take();
    }

    /// Runs one command on a shared connection, bounded by the command timeout.
    async fn run<T, F, Fut>(&self, command: F) -> CacheResult<T>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        let conn = self.connection().await?;

        let outcome = match tokio::time::timeout(self.command_timeout, command(conn)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => CacheError::Redis(e),
            Err(_) => CacheError::Timeout,
        };

        warn!("Redis command failed, dropping connection: {}", outcome);
        self.reset_connection().await;
        Err(outcome)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.run(|mut conn| async move { conn.get::<_, Option<String>>(key).await })
            .await
    }

    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> CacheResult<()> {
        self.run(|mut conn| async move {
            match ttl_secs {
                Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await,
                None => conn.set::<_, _, ()>(key, value).await,
            }
        })
        .await
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        self.run(|mut conn| async move { conn.del::<_, u64>(key).await })
            .await
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        self.run(|mut conn| async move { conn.del::<_, u64>(keys).await })
            .await
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        self.run(|mut conn| async move { conn.keys::<_, Vec<String>>(pattern).await })
            .await
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.run(|mut conn| async move { conn.exists::<_, bool>(key).await })
            .await
    }

    async fn flush(&self) -> CacheResult<()> {
        self.run(|mut conn| async move {
            redis::cmd("FLUSHDB").query_async::<()>(&mut conn).await
        })
        .await
    }

    async fn ping(&self) -> CacheResult<String> {
        self.run(|mut conn| async move {
            redis::cmd("PING").query_async::<String>(&mut conn).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_url() {
        let result = RedisStore::new("not-a-redis-url", Duration::from_millis(100));
        assert!(matches!(result, Err(CacheError::Redis(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_error() {
        // Port 1 on loopback refuses connections.
        let store = RedisStore::new("redis://127.0.0.1:1", Duration::from_millis(500)).unwrap();

        let result = store.get("post:1").await;

        assert!(result.is_err());
        assert!(format!("{:?}", store).contains("no_connection"));
    }
}
