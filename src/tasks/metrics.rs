//! Metrics Reporter Task
//!
//! Logs the cache counters at a fixed interval when monitoring is enabled.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheClient;

/// Spawns a task that logs a metrics snapshot every `interval_secs`.
pub fn spawn_metrics_reporter(cache: CacheClient, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache metrics reporter with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let snapshot = cache.metrics();
            if snapshot.hits + snapshot.misses + snapshot.errors == 0 {
                debug!("Cache metrics: no traffic yet");
                continue;
            }

            info!(
                hits = snapshot.hits,
                misses = snapshot.misses,
                errors = snapshot.errors,
                hit_rate = snapshot.hit_rate(),
                "Cache metrics"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, RetryPolicy};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reporter_leaves_counters_untouched() {
        let cache = CacheClient::new(Arc::new(MemoryStore::new(10)), RetryPolicy::no_retry());
        cache.get::<String>("post:missing").await;

        let handle = spawn_metrics_reporter(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1200)).await;

        assert_eq!(cache.metrics().misses, 1);
        assert!(!handle.is_finished());

        handle.abort();
    }
}
