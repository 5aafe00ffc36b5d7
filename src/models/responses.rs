//! Response DTOs for the blog API
//!
//! Defines the structure of outgoing HTTP response bodies. Post bodies are
//! also what the cache stores, so they round-trip through serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::MetricsSnapshot;
use crate::pagination::Page;
use crate::posts::Post;

/// A single post as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            description: post.description,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// One page of posts (GET /posts).
pub type PostsResponse = Page<PostResponse>;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status of the service itself
    pub status: String,
    /// "up" if the cache store answered PING, "down" otherwise
    pub cache: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// The service is healthy whenever it can answer; a cache outage only
    /// degrades it.
    pub fn new(cache_up: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            cache: if cache_up { "up" } else { "down" }.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the metrics endpoint (GET /cache/metrics)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<MetricsSnapshot> for MetricsResponse {
    fn from(snapshot: MetricsSnapshot) -> Self {
        Self {
            hits: snapshot.hits,
            misses: snapshot.misses,
            errors: snapshot.errors,
            hit_rate: snapshot.hit_rate(),
        }
    }
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
