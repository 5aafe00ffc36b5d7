//! API Handlers
//!
//! HTTP request handlers for the posts resource and the cache endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::cache::{CacheClient, EntityCache, KeySpace, KeyValueStore, RetryPolicy};
use crate::config::CacheConfig;
use crate::error::{ApiError, Result};
use crate::models::{
    CreatePostRequest, HealthResponse, MessageResponse, MetricsResponse, PostResponse,
    PostsResponse, UpdatePostRequest,
};
use crate::pagination::{Pagination, PaginationQuery};
use crate::posts::{PostRepository, PostsService};

/// Namespace shared by every post key.
pub const POST_NAMESPACE: &str = "post";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostsService,
    /// Same client the posts service caches through, so metrics are shared
    pub cache: CacheClient,
}

impl AppState {
    pub fn new(posts: PostsService) -> Self {
        let cache = posts.cache().client().clone();
        Self { posts, cache }
    }

    /// Wires a cache client, the post cache and the service over `store`.
    pub fn build(
        store: Arc<dyn KeyValueStore>,
        repository: Arc<dyn PostRepository>,
        config: CacheConfig,
    ) -> Self {
        let client = CacheClient::new(store, RetryPolicy::from_config(&config));
        let cache = EntityCache::new(client, KeySpace::new(POST_NAMESPACE), config);
        Self::new(PostsService::new(repository, cache))
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidRequest(format!("Invalid post id: {}", raw)))
}

// == Posts ==
/// Handler for POST /posts
pub async fn create_post_handler(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    let post = state.posts.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Handler for GET /posts?page=&step=
pub async fn list_posts_handler(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PostsResponse>> {
    let pagination = Pagination::from_query(query)?;
    Ok(Json(state.posts.find_all(pagination).await?))
}

/// Handler for GET /posts/:id
pub async fn get_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>> {
    let id = parse_id(&id)?;
    Ok(Json(state.posts.find_one(id).await?))
}

/// Handler for PATCH /posts/:id
pub async fn update_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>> {
    let id = parse_id(&id)?;
    Ok(Json(state.posts.update(id, req.into()).await?))
}

/// Handler for DELETE /posts/:id
pub async fn delete_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    state.posts.remove(id).await?;
    Ok(Json(MessageResponse::new(format!("Post {} deleted", id))))
}

// == Cache ==
/// Handler for GET /health
///
/// Always 200; a failed PING only reports the cache as down.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.cache.ping().await))
}

/// Handler for GET /cache/metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(state.cache.metrics().into())
}

/// Handler for DELETE /cache/metrics
pub async fn reset_metrics_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.reset_metrics();
    Json(MessageResponse::new("Cache metrics reset"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::posts::InMemoryPostRepository;

    fn test_state() -> AppState {
        AppState::build(
            Arc::new(MemoryStore::new(100)),
            Arc::new(InMemoryPostRepository::new()),
            CacheConfig::default(),
        )
    }

    fn create_request(title: &str) -> Json<CreatePostRequest> {
        Json(CreatePostRequest {
            title: title.to_string(),
            description: "body".to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_and_get_handler() {
        let state = test_state();

        let (status, Json(created)) = create_post_handler(State(state.clone()), create_request("Hello"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(found) = get_post_handler(State(state), Path(created.id.to_string()))
            .await
            .unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_get_with_malformed_id() {
        let state = test_state();

        let result = get_post_handler(State(state), Path("not-a-uuid".to_string())).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();
        let (_, Json(created)) = create_post_handler(State(state.clone()), create_request("Bye"))
            .await
            .unwrap();

        let result = delete_post_handler(State(state.clone()), Path(created.id.to_string())).await;
        assert!(result.is_ok());

        let result = get_post_handler(State(state), Path(created.id.to_string())).await;
        assert_eq!(result.err(), Some(ApiError::post_not_found()));
    }

    #[tokio::test]
    async fn test_list_rejects_oversized_step() {
        let state = test_state();
        let query = PaginationQuery {
            page: Some(1),
            step: Some(500),
        };

        let result = list_posts_handler(State(state), Query(query)).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_metrics_handlers() {
        let state = test_state();
        let (_, Json(created)) = create_post_handler(State(state.clone()), create_request("M"))
            .await
            .unwrap();
        get_post_handler(State(state.clone()), Path(created.id.to_string()))
            .await
            .unwrap();
        get_post_handler(State(state.clone()), Path(created.id.to_string()))
            .await
            .unwrap();

        let Json(metrics) = metrics_handler(State(state.clone())).await;
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);

        reset_metrics_handler(State(state.clone())).await;
        let Json(metrics) = metrics_handler(State(state)).await;
        assert_eq!(metrics.hits + metrics.misses + metrics.errors, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(test_state())).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.cache, "up");
    }
}
