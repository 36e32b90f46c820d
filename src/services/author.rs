//! Author service
//!
//! Byline profile management. An author with posts cannot be deleted; the
//! posts must be reassigned first, and the API surfaces that as a conflict.

use crate::db::repositories::AuthorRepository;
use crate::models::{Author, CreateAuthorInput, UpdateAuthorInput};
use crate::services::slug::{generate_slug, unique_slug};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

/// Author service errors
#[derive(Debug, Error)]
pub enum AuthorServiceError {
    #[error("Author not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Author has {0} posts; reassign them before deleting")]
    HasPosts(i64),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Author service
pub struct AuthorService {
    authors: Arc<dyn AuthorRepository>,
}

impl AuthorService {
    /// Create a new author service
    pub fn new(authors: Arc<dyn AuthorRepository>) -> Self {
        Self { authors }
    }

    /// Create an author
    pub async fn create(&self, input: CreateAuthorInput) -> Result<Author, AuthorServiceError> {
        if input.name.trim().is_empty() {
            return Err(AuthorServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        let slug = match &input.slug {
            Some(slug) if !slug.trim().is_empty() => {
                let slug = slug.trim().to_string();
                if self.authors.slug_exists(&slug, None).await? {
                    return Err(AuthorServiceError::DuplicateSlug(slug));
                }
                slug
            }
            _ => {
                let base = generate_slug(&input.name);
                let authors = &self.authors;
                unique_slug(&base, |candidate| async move {
                    authors.slug_exists(&candidate, None).await
                })
                .await?
            }
        };

        let now = Utc::now();
        let author = Author {
            id: 0,
            slug,
            name: input.name.trim().to_string(),
            bio: input.bio,
            avatar_url: input.avatar_url,
            email: input.email,
            created_at: now,
            updated_at: now,
        };

        Ok(self.authors.create(&author).await?)
    }

    /// Get an author by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Author, AuthorServiceError> {
        self.authors
            .get_by_id(id)
            .await?
            .ok_or(AuthorServiceError::NotFound)
    }

    /// Get an author by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Author, AuthorServiceError> {
        self.authors
            .get_by_slug(slug)
            .await?
            .ok_or(AuthorServiceError::NotFound)
    }

    /// List all authors, ordered by name
    pub async fn list(&self) -> Result<Vec<Author>, AuthorServiceError> {
        Ok(self.authors.list().await?)
    }

    /// Update an author
    pub async fn update(
        &self,
        id: i64,
        input: UpdateAuthorInput,
    ) -> Result<Author, AuthorServiceError> {
        self.get_by_id(id).await?;

        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(AuthorServiceError::ValidationError(
                    "Name cannot be empty".to_string(),
                ));
            }
        }
        if let Some(slug) = &input.slug {
            if slug.trim().is_empty() {
                return Err(AuthorServiceError::ValidationError(
                    "Slug cannot be empty".to_string(),
                ));
            }
            if self.authors.slug_exists(slug, Some(id)).await? {
                return Err(AuthorServiceError::DuplicateSlug(slug.clone()));
            }
        }

        self.authors.update(id, &input).await?;
        self.get_by_id(id).await
    }

    /// Delete an author.
    ///
    /// Refused while any post still carries this byline.
    pub async fn delete(&self, id: i64) -> Result<(), AuthorServiceError> {
        self.get_by_id(id).await?;

        let post_count = self.authors.count_posts(id).await?;
        if post_count > 0 {
            return Err(AuthorServiceError::HasPosts(post_count));
        }

        Ok(self.authors.delete(id).await?)
    }
}
