//! API Module
//!
//! HTTP handlers and routing for the blog REST API.
//!
//! # Endpoints
//! - `POST /posts`, `GET /posts` - Create and list posts
//! - `GET|PATCH|DELETE /posts/:id` - Single post operations
//! - `GET /health` - Health check including cache reachability
//! - `GET|DELETE /cache/metrics` - Read or reset cache counters

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
