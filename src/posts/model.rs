//! Post record and the inputs that create or change it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TITLE_MAX_LENGTH: usize = 255;
pub const DESCRIPTION_MAX_LENGTH: usize = 10_000;

/// A stored blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub description: String,
}

impl NewPost {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_title(&self.title).or_else(|| validate_description(&self.description))
    }
}

/// Partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PostChanges {
    pub fn validate(&self) -> Option<String> {
        self.title
            .as_deref()
            .and_then(validate_title)
            .or_else(|| self.description.as_deref().and_then(validate_description))
    }

    /// Applies the changes to `post`, bumping `updated_at`.
    pub fn apply(self, post: &mut Post, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(description) = self.description {
            post.description = description;
        }
        post.updated_at = now;
    }
}

fn validate_title(title: &str) -> Option<String> {
    if title.trim().is_empty() {
        return Some("Title is required".to_string());
    }
    if title.chars().count() > TITLE_MAX_LENGTH {
        return Some(format!(
            "Title must not exceed {} characters",
            TITLE_MAX_LENGTH
        ));
    }
    None
}

fn validate_description(description: &str) -> Option<String> {
    if description.trim().is_empty() {
        return Some("Description is required".to_string());
    }
    if description.chars().count() > DESCRIPTION_MAX_LENGTH {
        return Some(format!(
            "Description must not exceed {} characters",
            DESCRIPTION_MAX_LENGTH
        ));
    }
    None
}
