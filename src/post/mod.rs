//! Post Module
//!
//! Blog post entity, request validation and the repository that stores posts
//! under `posts:<id>` keys.

mod repository;

pub use repository::{post_key, PostRepository, POST_PREFIX};

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PostKvError, Result};
use crate::pagination::Paginated;

// =============================================================================
// Validation Limits
// =============================================================================

pub const MIN_TITLE_LENGTH: usize = 1;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MIN_CONTENT_LENGTH: usize = 1;
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// A blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// New post stamped with the current time
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_created_at(id, title, content, Utc::now())
    }

    /// New post with an explicit creation time
    pub fn with_created_at(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            created_at: at,
            updated_at: at,
        }
    }

    /// Replace title and content, advancing `updated_at`
    ///
    /// `updated_at` strictly increases even if the clock has not moved.
    pub fn update(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.title = title.into();
        self.content = content.into();

        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::nanoseconds(1)
        };
    }
}

impl Paginated for Post {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    /// Newest first; equal timestamps fall back to id ascending
    fn ordering(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

impl CreatePostRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_content(&self.content)
    }
}

/// Body of an update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
}

impl UpdatePostRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_content(&self.content)
    }
}

fn validate_title(title: &str) -> Result<()> {
    let length = title.chars().count();
    if length < MIN_TITLE_LENGTH {
        return Err(PostKvError::validation("title", "title is required"));
    }
    if length > MAX_TITLE_LENGTH {
        return Err(PostKvError::validation("title", "title is too long"));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<()> {
    let length = content.chars().count();
    if length < MIN_CONTENT_LENGTH {
        return Err(PostKvError::validation("content", "content is required"));
    }
    if length > MAX_CONTENT_LENGTH {
        return Err(PostKvError::validation("content", "content is too long"));
    }
    Ok(())
}

/// Check a caller-supplied post id: non-empty, `[a-zA-Z0-9-]+`
pub fn validate_post_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(PostKvError::validation("id", "post ID is required"));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(PostKvError::validation("id", "invalid post ID format"));
    }
    Ok(())
}

/// Fresh post id, always valid under `validate_post_id`
pub fn generate_post_id() -> String {
    format!("post-{}", uuid::Uuid::new_v4().simple())
}
