//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Category name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Category with post count for list views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithCount {
    /// The category itself
    #[serde(flatten)]
    pub category: Category,
    /// Number of published posts in this category
    pub post_count: i64,
}

/// Input for creating a new category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    /// URL-friendly slug (optional, generated from name when absent)
    pub slug: Option<String>,
    /// Category name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

/// Input for updating an existing category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    /// New slug (optional)
    pub slug: Option<String>,
    /// New name (optional)
    pub name: Option<String>,
    /// New description (optional)
    pub description: Option<String>,
}
