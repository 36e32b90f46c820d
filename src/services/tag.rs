//! Tag service
//!
//! Read and cleanup operations for tags. Tags are created implicitly when
//! posts are saved (see the post service); this service covers the tag
//! cloud and admin-side deletion.

use crate::db::repositories::TagRepository;
use crate::models::{Tag, TagWithCount};
use std::sync::Arc;
use thiserror::Error;

/// Default number of tags in the tag cloud
const DEFAULT_CLOUD_LIMIT: usize = 50;

/// Tag service errors
#[derive(Debug, Error)]
pub enum TagServiceError {
    #[error("Tag not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Tag service
pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    /// List all tags ordered by name
    pub async fn list(&self) -> Result<Vec<Tag>, TagServiceError> {
        Ok(self.tags.list().await?)
    }

    /// Most-used tags with published-post counts
    pub async fn cloud(&self, limit: Option<usize>) -> Result<Vec<TagWithCount>, TagServiceError> {
        Ok(self
            .tags
            .list_with_counts(limit.unwrap_or(DEFAULT_CLOUD_LIMIT))
            .await?)
    }

    /// Delete a tag by slug, detaching it from all posts
    pub async fn delete_by_slug(&self, slug: &str) -> Result<(), TagServiceError> {
        let tag = self
            .tags
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| TagServiceError::NotFound(slug.to_string()))?;

        Ok(self.tags.delete(tag.id).await?)
    }
}
