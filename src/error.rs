//! Error types for the blog service
//!
//! `CacheError` covers everything that can go wrong talking to the cache
//! store; `ApiError` is what the HTTP layer turns into responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Failures raised by a key-value store or by payload encoding.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Transport or protocol error reported by Redis
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store did not answer within the command timeout
    #[error("Cache operation timeout")]
    Timeout,

    /// Store cannot serve requests right now
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Glob pattern could not be parsed
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Key or value rejected by the store
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Store is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),
}

impl CacheError {
    /// Whether another attempt could succeed. Rejected input and a full
    /// store fail the same way every time.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            CacheError::InvalidPattern(_) | CacheError::InvalidRequest(_) | CacheError::CacheFull(_)
        )
    }
}

// == API Error Enum ==
/// Errors surfaced to HTTP clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request failed validation
    #[error("{0}")]
    InvalidRequest(String),

    /// Unexpected failure in a collaborator
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The standard "post not found" error.
    pub fn post_not_found() -> Self {
        ApiError::NotFound("Post not found".to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Result type for store operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Result type for service and HTTP operations.
pub type Result<T> = std::result::Result<T, ApiError>;
