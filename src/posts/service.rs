//! Posts Service
//!
//! CRUD over the post repository with every read served through the
//! entity cache and every mutation followed by the matching invalidation.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::EntityCache;
use crate::error::{ApiError, Result};
use crate::models::{PostResponse, PostsResponse};
use crate::pagination::{Page, Pagination};
use crate::posts::{NewPost, PageOrder, PostChanges, PostRepository};

#[derive(Clone)]
pub struct PostsService {
    repository: Arc<dyn PostRepository>,
    cache: EntityCache,
}

impl PostsService {
    pub fn new(repository: Arc<dyn PostRepository>, cache: EntityCache) -> Self {
        Self { repository, cache }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub async fn create(&self, post: NewPost) -> Result<PostResponse> {
        if let Some(message) = post.validate() {
            return Err(ApiError::InvalidRequest(message));
        }
        info!("Creating new post with title: {}", post.title);

        let saved = self.repository.create(post).await?;

        // A new post shifts every page; it cannot be in any entity key yet.
        self.cache.invalidate_list_pages().await;

        info!("Post created successfully with ID: {}", saved.id);
        Ok(saved.into())
    }

    pub async fn find_all(&self, pagination: Pagination) -> Result<PostsResponse> {
        let Pagination { page, step } = pagination;
        debug!("Fetching posts page {} with step {}", page, step);

        let repository = Arc::clone(&self.repository);
        self.cache
            .get_or_compute_list(page, step, || async move {
                let (posts, total) = repository
                    .find_page(page, step, PageOrder::CreatedAtDesc)
                    .await?;
                debug!("Fetched {} posts from repository", posts.len());

                Ok::<_, ApiError>(Page {
                    items: posts.into_iter().map(PostResponse::from).collect(),
                    total,
                    page,
                    step,
                })
            })
            .await
    }

    pub async fn find_one(&self, id: Uuid) -> Result<PostResponse> {
        debug!("Fetching post with ID: {}", id);

        let repository = Arc::clone(&self.repository);
        self.cache
            .get_or_compute_entity(&id.to_string(), || async move {
                let post = repository
                    .find_by_id(id)
                    .await?
                    .ok_or_else(ApiError::post_not_found)?;
                debug!("Fetched post from repository: {}", id);
                Ok::<_, ApiError>(PostResponse::from(post))
            })
            .await
    }

    pub async fn update(&self, id: Uuid, changes: PostChanges) -> Result<PostResponse> {
        if let Some(message) = changes.validate() {
            return Err(ApiError::InvalidRequest(message));
        }
        info!("Updating post with ID: {}", id);

        let updated = self
            .repository
            .update(id, changes)
            .await?
            .ok_or_else(ApiError::post_not_found)?;

        self.invalidate_post(id).await;

        info!("Post updated successfully: {}", id);
        Ok(updated.into())
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        info!("Deleting post with ID: {}", id);

        if !self.repository.delete(id).await? {
            return Err(ApiError::post_not_found());
        }

        self.invalidate_post(id).await;

        info!("Post deleted successfully: {}", id);
        Ok(())
    }

    async fn invalidate_post(&self, id: Uuid) {
        self.cache.invalidate_entity(&id.to_string()).await;
        self.cache.invalidate_list_pages().await;
    }
}
