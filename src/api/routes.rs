//! API Routes
//!
//! Configures the Axum router with the posts and cache endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_post_handler, delete_post_handler, get_post_handler, health_handler,
    list_posts_handler, metrics_handler, reset_metrics_handler, update_post_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /posts` - Create a post
/// - `GET /posts?page=&step=` - List one page of posts
/// - `GET /posts/:id` - Fetch a post
/// - `PATCH /posts/:id` - Update a post
/// - `DELETE /posts/:id` - Delete a post
/// - `GET /health` - Service and cache health
/// - `GET /cache/metrics` - Hit/miss/error counters
/// - `DELETE /cache/metrics` - Reset the counters
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/posts", post(create_post_handler).get(list_posts_handler))
        .route(
            "/posts/:id",
            get(get_post_handler)
                .patch(update_post_handler)
                .delete(delete_post_handler),
        )
        .route("/health", get(health_handler))
        .route(
            "/cache/metrics",
            get(metrics_handler).delete(reset_metrics_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
