//! Posts Module
//!
//! The blog post domain: the record itself, its persistence contract and
//! the cache-aside service the HTTP handlers call.

mod model;
mod repository;
mod service;

pub use model::{NewPost, Post, PostChanges, DESCRIPTION_MAX_LENGTH, TITLE_MAX_LENGTH};
pub use repository::{InMemoryPostRepository, PageOrder, PostRepository};
pub use service::PostsService;
