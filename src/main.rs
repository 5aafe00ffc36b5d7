//! Blog Cache - posts API with a cache-aside layer
//!
//! Serves the posts API over HTTP, caching reads in Redis (or an in-process
//! store) and invalidating on writes.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog_cache::api::create_router;
use blog_cache::cache::{KeyValueStore, MemoryStore, RedisStore};
use blog_cache::posts::InMemoryPostRepository;
use blog_cache::{spawn_cleanup_task, spawn_metrics_reporter, AppState, CacheBackend, Config};

/// Main entry point for the blog server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache store for the configured backend
/// 4. Start background tasks (memory sweep, metrics reporter)
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Blog Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, port={}, ttl={}s/{}s/{}s, retry={}x{:?}",
        config.cache_backend,
        config.server_port,
        config.cache.default_ttl,
        config.cache.entity_ttl,
        config.cache.list_ttl,
        config.cache.max_retry_attempts,
        config.cache.retry_delay
    );

    let mut background: Vec<JoinHandle<()>> = Vec::new();

    let store: Arc<dyn KeyValueStore> = match config.cache_backend {
        CacheBackend::Redis => {
            let store = RedisStore::new(&config.redis_url, config.redis_command_timeout)
                .with_context(|| format!("invalid REDIS_URL {}", config.redis_url))?;
            info!("Redis cache store configured at {}", config.redis_url);
            Arc::new(store)
        }
        CacheBackend::Memory => {
            let store = Arc::new(MemoryStore::new(config.max_entries));
            background.push(spawn_cleanup_task(store.clone(), config.cleanup_interval));
            info!("In-memory cache store initialized (max_entries={})", config.max_entries);
            store
        }
    };

    let state = AppState::build(
        store,
        Arc::new(InMemoryPostRepository::new()),
        config.cache.clone(),
    );

    if !state.cache.ping().await {
        warn!("Cache store is not reachable yet; requests will fall through to the repository");
    }

    if config.cache.monitoring_enabled {
        background.push(spawn_metrics_reporter(
            state.cache.clone(),
            config.metrics_interval,
        ));
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(background))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the
/// background tasks.
async fn shutdown_signal(background: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in &background {
        handle.abort();
    }
    warn!("{} background task(s) aborted", background.len());
}
