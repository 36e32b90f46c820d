//! Author model
//!
//! Authors are public byline profiles attached to blog posts. They are not
//! login accounts; console access is handled by `User`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Byline profile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Display name
    pub name: String,
    /// Short biography (markdown)
    pub bio: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Public contact email
    pub email: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new author
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthorInput {
    /// URL-friendly slug (optional, generated from name when absent)
    pub slug: Option<String>,
    /// Display name
    pub name: String,
    /// Short biography
    pub bio: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Public contact email
    pub email: Option<String>,
}

/// Input for updating an existing author
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAuthorInput {
    /// New slug (optional)
    pub slug: Option<String>,
    /// New display name (optional)
    pub name: Option<String>,
    /// New biography (optional)
    pub bio: Option<String>,
    /// New avatar URL (optional)
    pub avatar_url: Option<String>,
    /// New contact email (optional)
    pub email: Option<String>,
}
