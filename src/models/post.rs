//! Blog post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PostStatus` enum for publication states
//! - Input types for creating and updating posts
//! - `PostFilter` for admin list queries
//! - Pagination types shared by all list endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Post title
    pub title: String,
    /// Short teaser shown in list views
    pub excerpt: Option<String>,
    /// Markdown content
    pub content: String,
    /// Rendered HTML content
    pub content_html: String,
    /// Byline author ID
    pub author_id: i64,
    /// Category ID
    pub category_id: Option<i64>,
    /// Publication status
    pub status: PostStatus,
    /// Featured image URL
    pub featured_image: Option<String>,
    /// SEO title override
    pub seo_title: Option<String>,
    /// SEO meta description
    pub seo_description: Option<String>,
    /// Publication timestamp
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Post with joined display data for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithMeta {
    /// The post itself
    #[serde(flatten)]
    pub post: Post,
    /// Author display name
    pub author_name: Option<String>,
    /// Author slug
    pub author_slug: Option<String>,
    /// Category display name
    pub category_name: Option<String>,
    /// Category slug
    pub category_slug: Option<String>,
    /// Tag names attached to the post
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Post publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Draft - not visible to public
    Draft,
    /// Published - visible to public
    Published,
    /// Archived - hidden but not deleted
    Archived,
}

impl Default for PostStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl PostStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            "archived" => Some(PostStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bulk status action applied to a set of posts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkPostAction {
    /// Set status to published
    Publish,
    /// Set status back to draft
    Unpublish,
    /// Set status to archived
    Archive,
}

impl BulkPostAction {
    /// The status this action writes
    pub fn target_status(&self) -> PostStatus {
        match self {
            BulkPostAction::Publish => PostStatus::Published,
            BulkPostAction::Unpublish => PostStatus::Draft,
            BulkPostAction::Archive => PostStatus::Archived,
        }
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    /// URL-friendly slug (optional, generated from title when absent)
    pub slug: Option<String>,
    /// Post title
    pub title: String,
    /// Short teaser
    pub excerpt: Option<String>,
    /// Markdown content
    pub content: String,
    /// Byline author ID
    pub author_id: i64,
    /// Category ID
    pub category_id: Option<i64>,
    /// Publication status (defaults to Draft)
    pub status: Option<PostStatus>,
    /// Featured image URL
    pub featured_image: Option<String>,
    /// SEO title override
    pub seo_title: Option<String>,
    /// SEO meta description
    pub seo_description: Option<String>,
    /// Tag names to attach
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreatePostInput {
    /// Create a new CreatePostInput with required fields
    pub fn new(title: String, content: String, author_id: i64) -> Self {
        Self {
            slug: None,
            title,
            excerpt: None,
            content,
            author_id,
            category_id: None,
            status: None,
            featured_image: None,
            seo_title: None,
            seo_description: None,
            tags: Vec::new(),
        }
    }

    /// Set the slug
    pub fn with_slug(mut self, slug: String) -> Self {
        self.slug = Some(slug);
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Input for updating an existing post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    /// New slug (optional)
    pub slug: Option<String>,
    /// New title (optional)
    pub title: Option<String>,
    /// New excerpt (optional)
    pub excerpt: Option<String>,
    /// New markdown content (optional)
    pub content: Option<String>,
    /// New byline author ID (optional)
    pub author_id: Option<i64>,
    /// New category ID (optional)
    pub category_id: Option<i64>,
    /// New status (optional)
    pub status: Option<PostStatus>,
    /// New featured image URL (optional)
    pub featured_image: Option<String>,
    /// New SEO title (optional)
    pub seo_title: Option<String>,
    /// New SEO description (optional)
    pub seo_description: Option<String>,
    /// Replacement tag list (optional; replaces all tags when set)
    pub tags: Option<Vec<String>>,
}

impl UpdatePostInput {
    /// Create a new empty UpdatePostInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    /// Set the content
    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.slug.is_some()
            || self.title.is_some()
            || self.excerpt.is_some()
            || self.content.is_some()
            || self.author_id.is_some()
            || self.category_id.is_some()
            || self.status.is_some()
            || self.featured_image.is_some()
            || self.seo_title.is_some()
            || self.seo_description.is_some()
            || self.tags.is_some()
    }
}

/// Filter for admin post list queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFilter {
    /// Restrict to a publication status
    pub status: Option<PostStatus>,
    /// Restrict to a category
    pub category_id: Option<i64>,
    /// Restrict to an author
    pub author_id: Option<i64>,
    /// Restrict to a tag slug
    pub tag: Option<String>,
    /// Case-insensitive match against title and excerpt
    pub search: Option<String>,
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters, clamping out-of-range values
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries.
    ///
    /// Computed in i64 so an arbitrarily large page number from the query
    /// string cannot overflow.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Map the items to another type, keeping the pagination metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let per_page = i64::from(self.per_page);
        let pages = self.total / per_page + i64::from(self.total % per_page != 0);
        pages.clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [PostStatus::Draft, PostStatus::Published, PostStatus::Archived] {
            assert_eq!(PostStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(PostStatus::from_str("bogus"), None);
    }

    #[test]
    fn test_bulk_action_targets() {
        assert_eq!(BulkPostAction::Publish.target_status(), PostStatus::Published);
        assert_eq!(BulkPostAction::Unpublish.target_status(), PostStatus::Draft);
        assert_eq!(BulkPostAction::Archive.target_status(), PostStatus::Archived);
    }

    #[test]
    fn test_list_params_clamping() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
        assert_eq!(params.offset(), 0);

        let params = ListParams::new(3, 20);
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_list_params_huge_page_does_not_overflow() {
        let params = ListParams::new(u32::MAX, 100);
        assert_eq!(params.offset(), (i64::from(u32::MAX) - 1) * 100);

        let result: PagedResult<i32> = PagedResult::new(vec![], i64::MAX, &params);
        assert_eq!(result.total_pages(), u32::MAX);
    }

    #[test]
    fn test_paged_result_math() {
        let params = ListParams::new(2, 10);
        let result = PagedResult::new(vec![1, 2, 3], 25, &params);
        assert_eq!(result.total_pages(), 3);
        assert!(result.has_next());
        assert!(result.has_prev());
    }
}
