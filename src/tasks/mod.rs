//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Cleanup: Sweeps expired entries from the in-memory store
//! - Metrics Reporter: Logs cache counters when monitoring is enabled

mod cleanup;
mod metrics;

pub use cleanup::spawn_cleanup_task;
pub use metrics::spawn_metrics_reporter;
