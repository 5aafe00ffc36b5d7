//! Blog Cache - cache-aside layer for a small posts API
//!
//! A resilient key-value cache client (Redis or in-memory) with retry,
//! metrics and entity-aware invalidation, fronting a posts service.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod posts;
pub mod tasks;

pub use api::AppState;
pub use config::{CacheBackend, CacheConfig, Config};
pub use tasks::{spawn_cleanup_task, spawn_metrics_reporter};
