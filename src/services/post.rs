//! Post service
//!
//! Business logic for blog posts: validation, slug management, markdown
//! rendering, tag association, publish timestamps, and cache invalidation.
//! Public reads go through the cache; every write invalidates the `posts:`
//! prefix.

use crate::cache::MemoryCache;
use crate::db::repositories::{PostRepository, TagRepository};
use crate::models::{
    BulkPostAction, CreatePostInput, ListParams, PagedResult, Post, PostFilter, PostStatus,
    PostWithMeta, Tag, UpdatePostInput,
};
use crate::services::markdown::MarkdownRenderer;
use crate::services::slug::{generate_slug, unique_slug};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Cache key prefix for all post entries
const CACHE_PREFIX: &str = "posts:";

/// Maximum title length
const MAX_TITLE_LENGTH: usize = 200;

/// Auto-generated excerpt length in characters
const EXCERPT_LENGTH: usize = 200;

/// Post service errors
#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error("Post not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    cache: Arc<MemoryCache>,
    markdown: MarkdownRenderer,
}

impl PostService {
    /// Create a new post service
    pub fn new(
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        cache: Arc<MemoryCache>,
    ) -> Self {
        Self {
            posts,
            tags,
            cache,
            markdown: MarkdownRenderer::new(),
        }
    }

    /// Create a new post
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        self.validate_title(&input.title)?;
        if input.content.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Content cannot be empty".to_string(),
            ));
        }

        let slug = match &input.slug {
            Some(slug) if !slug.trim().is_empty() => {
                let slug = slug.trim().to_string();
                if self.posts.slug_exists(&slug, None).await? {
                    return Err(PostServiceError::DuplicateSlug(slug));
                }
                slug
            }
            _ => {
                let base = generate_slug(&input.title);
                let posts = &self.posts;
                unique_slug(&base, |candidate| async move {
                    posts.slug_exists(&candidate, None).await
                })
                .await?
            }
        };

        let content_html = self.markdown.render(&input.content);
        let excerpt = match input.excerpt {
            Some(excerpt) if !excerpt.trim().is_empty() => Some(excerpt),
            _ => Some(self.markdown.excerpt(&input.content, EXCERPT_LENGTH)),
        };

        let status = input.status.unwrap_or_default();
        let now = Utc::now();
        let published_at = (status == PostStatus::Published).then_some(now);

        let post = Post {
            id: 0,
            slug,
            title: input.title.trim().to_string(),
            excerpt,
            content: input.content,
            content_html,
            author_id: input.author_id,
            category_id: input.category_id,
            status,
            featured_image: input.featured_image,
            seo_title: input.seo_title,
            seo_description: input.seo_description,
            published_at,
            created_at: now,
            updated_at: now,
        };

        let created = self.posts.create(&post).await?;

        if !input.tags.is_empty() {
            let tag_ids = self.resolve_tags(&input.tags).await?;
            self.tags.set_post_tags(created.id, &tag_ids).await?;
        }

        self.invalidate_cache().await;
        debug!(post_id = created.id, slug = %created.slug, "Created post");

        Ok(created)
    }

    /// Get a post by ID, regardless of status
    pub async fn get_by_id(&self, id: i64) -> Result<Post, PostServiceError> {
        self.posts
            .get_by_id(id)
            .await?
            .ok_or(PostServiceError::NotFound)
    }

    /// Get a published post by slug, with author/category/tag metadata.
    ///
    /// Drafts and archived posts are treated as absent.
    pub async fn get_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<PostWithMeta, PostServiceError> {
        let cache_key = format!("{}slug:{}", CACHE_PREFIX, slug);
        if let Ok(Some(cached)) = self.cache.get::<PostWithMeta>(&cache_key).await {
            return Ok(cached);
        }

        let post = self
            .posts
            .get_with_meta_by_slug(slug)
            .await?
            .filter(|p| p.post.status == PostStatus::Published)
            .ok_or(PostServiceError::NotFound)?;

        let _ = self.cache.set(&cache_key, &post).await;
        Ok(post)
    }

    /// List posts for the admin console, any status
    pub async fn list(
        &self,
        filter: PostFilter,
        params: ListParams,
    ) -> Result<PagedResult<PostWithMeta>, PostServiceError> {
        Ok(self.posts.list(&filter, &params).await?)
    }

    /// List published posts for the public site.
    ///
    /// Cached unless the request carries a search term.
    pub async fn list_published(
        &self,
        mut filter: PostFilter,
        params: ListParams,
    ) -> Result<PagedResult<PostWithMeta>, PostServiceError> {
        filter.status = Some(PostStatus::Published);

        let cache_key = (filter.search.is_none()).then(|| {
            format!(
                "{}list:{}:{}:{}:{}:{}",
                CACHE_PREFIX,
                params.page,
                params.per_page,
                filter.category_id.map_or(String::new(), |c| c.to_string()),
                filter.author_id.map_or(String::new(), |a| a.to_string()),
                filter.tag.as_deref().unwrap_or(""),
            )
        });

        if let Some(key) = &cache_key {
            if let Ok(Some(cached)) = self.cache.get::<PagedResult<PostWithMeta>>(key).await {
                return Ok(cached);
            }
        }

        let result = self.posts.list(&filter, &params).await?;

        if let Some(key) = &cache_key {
            let _ = self.cache.set(key, &result).await;
        }

        Ok(result)
    }

    /// Update an existing post
    pub async fn update(
        &self,
        id: i64,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        if !input.has_changes() {
            return Err(PostServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        let existing = self
            .posts
            .get_by_id(id)
            .await?
            .ok_or(PostServiceError::NotFound)?;

        if let Some(title) = &input.title {
            self.validate_title(title)?;
        }
        if let Some(content) = &input.content {
            if content.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Content cannot be empty".to_string(),
                ));
            }
        }

        if let Some(slug) = &input.slug {
            if slug.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Slug cannot be empty".to_string(),
                ));
            }
            if self.posts.slug_exists(slug, Some(id)).await? {
                return Err(PostServiceError::DuplicateSlug(slug.clone()));
            }
        }

        let content_html = input.content.as_deref().map(|c| self.markdown.render(c));

        // First transition to published stamps the publication date; it is
        // preserved across later unpublish/republish cycles.
        let published_at = (input.status == Some(PostStatus::Published)
            && existing.published_at.is_none())
        .then(Utc::now);

        self.posts
            .update(id, &input, content_html.as_deref(), published_at)
            .await?;

        if let Some(tag_names) = &input.tags {
            let tag_ids = self.resolve_tags(tag_names).await?;
            self.tags.set_post_tags(id, &tag_ids).await?;
        }

        self.invalidate_cache().await;

        self.posts
            .get_by_id(id)
            .await?
            .ok_or(PostServiceError::NotFound)
    }

    /// Delete a post
    pub async fn delete(&self, id: i64) -> Result<(), PostServiceError> {
        self.posts
            .get_by_id(id)
            .await?
            .ok_or(PostServiceError::NotFound)?;

        self.posts.delete(id).await?;
        self.invalidate_cache().await;
        Ok(())
    }

    /// Apply a bulk status action, returning the number of posts affected
    pub async fn bulk_action(
        &self,
        ids: &[i64],
        action: BulkPostAction,
    ) -> Result<u64, PostServiceError> {
        if ids.is_empty() {
            return Err(PostServiceError::ValidationError(
                "No post IDs provided".to_string(),
            ));
        }

        let affected = self
            .posts
            .bulk_update_status(ids, action.target_status())
            .await?;
        self.invalidate_cache().await;
        debug!(affected, ?action, "Applied bulk post action");
        Ok(affected)
    }

    /// Delete a set of posts, returning the number removed
    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<u64, PostServiceError> {
        if ids.is_empty() {
            return Err(PostServiceError::ValidationError(
                "No post IDs provided".to_string(),
            ));
        }

        let affected = self.posts.bulk_delete(ids).await?;
        self.invalidate_cache().await;
        Ok(affected)
    }

    /// Slugs of recently published posts, for sitemap pings
    pub async fn published_slugs(&self, limit: usize) -> Result<Vec<String>, PostServiceError> {
        Ok(self.posts.list_published_slugs(limit).await?)
    }

    fn validate_title(&self, title: &str) -> Result<(), PostServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PostServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(PostServiceError::ValidationError(format!(
                "Title cannot exceed {} characters",
                MAX_TITLE_LENGTH
            )));
        }
        Ok(())
    }

    /// Map tag names to IDs, creating tags that do not exist yet
    async fn resolve_tags(&self, names: &[String]) -> Result<Vec<i64>, PostServiceError> {
        let mut ids = Vec::with_capacity(names.len());

        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let tag = match self.tags.get_by_name(name).await? {
                Some(tag) => tag,
                None => {
                    let slug = generate_slug(name);
                    match self.tags.get_by_slug(&slug).await? {
                        Some(tag) => tag,
                        None => self.tags.create(&Tag::new(slug, name.to_string())).await?,
                    }
                }
            };
            ids.push(tag.id);
        }

        Ok(ids)
    }

    async fn invalidate_cache(&self) {
        self.cache.delete_prefix(CACHE_PREFIX).await;
    }
}
