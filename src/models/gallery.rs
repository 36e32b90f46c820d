//! Gallery model
//!
//! Images are optionally grouped into named collections; ungrouped images
//! have a null group and appear in the default stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named image collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryGroup {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Display order
    pub sort_order: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Gallery image entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Unique identifier
    pub id: i64,
    /// Owning group, null for the default stream
    pub group_id: Option<i64>,
    /// Image URL (usually under /uploads)
    pub url: String,
    /// Alt text for accessibility
    pub alt_text: Option<String>,
    /// Optional caption
    pub caption: Option<String>,
    /// Display order within the group
    pub sort_order: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Group with its images attached, for the public gallery endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryGroupWithImages {
    /// The group itself
    #[serde(flatten)]
    pub group: GalleryGroup,
    /// Images in display order
    pub images: Vec<GalleryImage>,
}

/// Input for creating a gallery group
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupInput {
    /// URL-friendly slug (optional, generated from name when absent)
    pub slug: Option<String>,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Display order
    pub sort_order: Option<i64>,
}

/// Input for registering a gallery image
#[derive(Debug, Clone, Deserialize)]
pub struct CreateImageInput {
    /// Owning group (optional)
    pub group_id: Option<i64>,
    /// Image URL
    pub url: String,
    /// Alt text
    pub alt_text: Option<String>,
    /// Caption
    pub caption: Option<String>,
    /// Display order
    pub sort_order: Option<i64>,
}

/// Input for updating a gallery image
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateImageInput {
    /// Move to another group; explicit null detaches the image
    #[serde(default)]
    pub group_id: Option<Option<i64>>,
    /// New alt text (optional)
    pub alt_text: Option<String>,
    /// New caption (optional)
    pub caption: Option<String>,
    /// New display order (optional)
    pub sort_order: Option<i64>,
}
