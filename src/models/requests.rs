//! Request DTOs for the blog API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::posts::{NewPost, PostChanges};

/// Request body for POST /posts
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub description: String,
}

impl From<CreatePostRequest> for NewPost {
    fn from(req: CreatePostRequest) -> Self {
        NewPost {
            title: req.title,
            description: req.description,
        }
    }
}

/// Request body for PATCH /posts/:id; omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UpdatePostRequest> for PostChanges {
    fn from(req: UpdatePostRequest) -> Self {
        PostChanges {
            title: req.title,
            description: req.description,
        }
    }
}
