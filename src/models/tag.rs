//! Tag model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity for cross-category post discovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Tag name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new Tag with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(slug: String, name: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            slug,
            name,
            created_at: Utc::now(),
        }
    }
}

/// Tag with post count for tag cloud functionality
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagWithCount {
    /// The tag itself
    #[serde(flatten)]
    pub tag: Tag,
    /// Number of published posts with this tag
    pub post_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_new() {
        let tag = Tag::new("web-design".to_string(), "Web Design".to_string());

        assert_eq!(tag.id, 0);
        assert_eq!(tag.slug, "web-design");
        assert_eq!(tag.name, "Web Design");
    }
}
