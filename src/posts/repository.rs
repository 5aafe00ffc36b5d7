//! Post persistence contract and the bundled in-memory implementation.
//!
//! "Not found" is an ordinary outcome here (`None` / `false`); errors are
//! reserved for the backing store failing.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::pagination::Pagination;
use crate::posts::{NewPost, Post, PostChanges};

/// Sort order for listing posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageOrder {
    /// Newest first
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    /// Returns one page of posts and the total number of posts.
    async fn find_page(&self, page: u32, step: u32, order: PageOrder) -> Result<(Vec<Post>, u64)>;

    async fn create(&self, post: NewPost) -> Result<Post>;

    /// Applies `changes`, returning the updated post or `None` if it does not exist.
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>>;

    /// Returns whether a post was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

// == In-Memory Repository ==
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn find_page(&self, page: u32, step: u32, order: PageOrder) -> Result<(Vec<Post>, u64)> {
        let posts = self.posts.read().await;

        let mut all: Vec<&Post> = posts.values().collect();
        // id breaks ties so pages stay stable for posts created in the same instant
        all.sort_by(|a, b| match order {
            PageOrder::CreatedAtDesc => b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
            PageOrder::CreatedAtAsc => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
        });

        let offset = usize::try_from(Pagination { page, step }.offset()).unwrap_or(usize::MAX);
        let items = all
            .into_iter()
            .skip(offset)
            .take(step as usize)
            .cloned()
            .collect();

        Ok((items, posts.len() as u64))
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: post.title,
            description: post.description,
            created_at: now,
            updated_at: now,
        };

        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let mut posts = self.posts.write().await;

        Ok(posts.get_mut(&id).map(|post| {
            changes.apply(post, Utc::now());
            post.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}
