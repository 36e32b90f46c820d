//! Category service
//!
//! Flat blog categories. Deleting a category leaves its posts
//! uncategorized rather than cascading.

use crate::cache::MemoryCache;
use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CategoryWithCount, CreateCategoryInput, UpdateCategoryInput};
use crate::services::slug::{generate_slug, unique_slug};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

/// Cache key prefix for all category entries
const CACHE_PREFIX: &str = "categories:";

/// Category service errors
#[derive(Debug, Error)]
pub enum CategoryServiceError {
    #[error("Category not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    cache: Arc<MemoryCache>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(categories: Arc<dyn CategoryRepository>, cache: Arc<MemoryCache>) -> Self {
        Self { categories, cache }
    }

    /// Create a category
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        if input.name.trim().is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        let slug = match &input.slug {
            Some(slug) if !slug.trim().is_empty() => {
                let slug = slug.trim().to_string();
                if self.categories.slug_exists(&slug, None).await? {
                    return Err(CategoryServiceError::DuplicateSlug(slug));
                }
                slug
            }
            _ => {
                let base = generate_slug(&input.name);
                let categories = &self.categories;
                unique_slug(&base, |candidate| async move {
                    categories.slug_exists(&candidate, None).await
                })
                .await?
            }
        };

        let category = Category {
            id: 0,
            slug,
            name: input.name.trim().to_string(),
            description: input.description,
            created_at: Utc::now(),
        };

        let created = self.categories.create(&category).await?;
        self.invalidate_cache().await;
        Ok(created)
    }

    /// Get a category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, CategoryServiceError> {
        self.categories
            .get_by_slug(slug)
            .await?
            .ok_or(CategoryServiceError::NotFound)
    }

    /// List all categories ordered by name
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.categories.list().await?)
    }

    /// Categories with published-post counts, cached
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, CategoryServiceError> {
        let cache_key = format!("{}with_counts", CACHE_PREFIX);
        if let Ok(Some(cached)) = self.cache.get::<Vec<CategoryWithCount>>(&cache_key).await {
            return Ok(cached);
        }

        let categories = self.categories.list_with_counts().await?;
        let _ = self.cache.set(&cache_key, &categories).await;
        Ok(categories)
    }

    /// Update a category
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        self.categories
            .get_by_id(id)
            .await?
            .ok_or(CategoryServiceError::NotFound)?;

        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(CategoryServiceError::ValidationError(
                    "Name cannot be empty".to_string(),
                ));
            }
        }
        if let Some(slug) = &input.slug {
            if self.categories.slug_exists(slug, Some(id)).await? {
                return Err(CategoryServiceError::DuplicateSlug(slug.clone()));
            }
        }

        self.categories.update(id, &input).await?;
        self.invalidate_cache().await;

        self.categories
            .get_by_id(id)
            .await?
            .ok_or(CategoryServiceError::NotFound)
    }

    /// Delete a category. Its posts become uncategorized.
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        self.categories
            .get_by_id(id)
            .await?
            .ok_or(CategoryServiceError::NotFound)?;

        self.categories.delete(id).await?;
        self.invalidate_cache().await;
        Ok(())
    }

    async fn invalidate_cache(&self) {
        self.cache.delete_prefix(CACHE_PREFIX).await;
        // Post lists embed category names
        self.cache.delete_prefix("posts:").await;
    }
}
