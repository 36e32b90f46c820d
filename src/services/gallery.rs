//! Gallery service
//!
//! Groups and images for the public gallery page. Deleting an image also
//! removes its file from the upload directory; deleting a group detaches
//! its images into the default stream.

use crate::cache::MemoryCache;
use crate::db::repositories::GalleryRepository;
use crate::models::{
    CreateGroupInput, CreateImageInput, GalleryGroup, GalleryGroupWithImages, GalleryImage,
    UpdateImageInput,
};
use crate::services::slug::{generate_slug, unique_slug};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Cache key prefix for all gallery entries
const CACHE_PREFIX: &str = "gallery:";

/// URL prefix under which uploaded files are served
const UPLOADS_URL_PREFIX: &str = "/uploads/";

/// Gallery service errors
#[derive(Debug, Error)]
pub enum GalleryServiceError {
    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Gallery service
pub struct GalleryService {
    gallery: Arc<dyn GalleryRepository>,
    cache: Arc<MemoryCache>,
    upload_path: PathBuf,
}

impl GalleryService {
    /// Create a new gallery service
    pub fn new(
        gallery: Arc<dyn GalleryRepository>,
        cache: Arc<MemoryCache>,
        upload_path: PathBuf,
    ) -> Self {
        Self {
            gallery,
            cache,
            upload_path,
        }
    }

    /// Create a gallery group
    pub async fn create_group(
        &self,
        input: CreateGroupInput,
    ) -> Result<GalleryGroup, GalleryServiceError> {
        if input.name.trim().is_empty() {
            return Err(GalleryServiceError::ValidationError(
                "Group name cannot be empty".to_string(),
            ));
        }

        let slug = match &input.slug {
            Some(slug) if !slug.trim().is_empty() => {
                let slug = slug.trim().to_string();
                if self.gallery.get_group_by_slug(&slug).await?.is_some() {
                    return Err(GalleryServiceError::DuplicateSlug(slug));
                }
                slug
            }
            _ => {
                let base = generate_slug(&input.name);
                let gallery = &self.gallery;
                unique_slug(&base, |candidate| async move {
                    Ok(gallery.get_group_by_slug(&candidate).await?.is_some())
                })
                .await?
            }
        };

        let group = GalleryGroup {
            id: 0,
            slug,
            name: input.name.trim().to_string(),
            description: input.description,
            sort_order: input.sort_order.unwrap_or(0),
            created_at: Utc::now(),
        };

        let created = self.gallery.create_group(&group).await?;
        self.invalidate_cache().await;
        Ok(created)
    }

    /// List groups in display order
    pub async fn list_groups(&self) -> Result<Vec<GalleryGroup>, GalleryServiceError> {
        Ok(self.gallery.list_groups().await?)
    }

    /// Groups with their images, plus the ungrouped default stream, cached.
    ///
    /// Returns `(groups, ungrouped_images)`.
    pub async fn public_gallery(
        &self,
    ) -> Result<(Vec<GalleryGroupWithImages>, Vec<GalleryImage>), GalleryServiceError> {
        let cache_key = format!("{}public", CACHE_PREFIX);
        if let Ok(Some(cached)) = self
            .cache
            .get::<(Vec<GalleryGroupWithImages>, Vec<GalleryImage>)>(&cache_key)
            .await
        {
            return Ok(cached);
        }

        let groups = self.gallery.list_groups_with_images().await?;
        let ungrouped: Vec<GalleryImage> = self
            .gallery
            .list_images(None)
            .await?
            .into_iter()
            .filter(|img| img.group_id.is_none())
            .collect();

        let result = (groups, ungrouped);
        let _ = self.cache.set(&cache_key, &result).await;
        Ok(result)
    }

    /// Delete a group. Its images fall back to the default stream.
    pub async fn delete_group(&self, id: i64) -> Result<(), GalleryServiceError> {
        self.gallery.delete_group(id).await?;
        self.invalidate_cache().await;
        Ok(())
    }

    /// Register an uploaded image in the gallery
    pub async fn add_image(
        &self,
        input: CreateImageInput,
    ) -> Result<GalleryImage, GalleryServiceError> {
        if input.url.trim().is_empty() {
            return Err(GalleryServiceError::ValidationError(
                "Image URL cannot be empty".to_string(),
            ));
        }

        let image = GalleryImage {
            id: 0,
            group_id: input.group_id,
            url: input.url.trim().to_string(),
            alt_text: input.alt_text,
            caption: input.caption,
            sort_order: input.sort_order.unwrap_or(0),
            created_at: Utc::now(),
        };

        let created = self.gallery.create_image(&image).await?;
        self.invalidate_cache().await;
        Ok(created)
    }

    /// List images, optionally restricted to one group
    pub async fn list_images(
        &self,
        group_id: Option<i64>,
    ) -> Result<Vec<GalleryImage>, GalleryServiceError> {
        Ok(self.gallery.list_images(group_id).await?)
    }

    /// Update an image: captioning, reordering, or moving between groups.
    ///
    /// `group_id: Some(None)` detaches the image into the default stream.
    pub async fn update_image(
        &self,
        id: i64,
        input: UpdateImageInput,
    ) -> Result<GalleryImage, GalleryServiceError> {
        self.gallery
            .get_image_by_id(id)
            .await?
            .ok_or(GalleryServiceError::NotFound)?;

        self.gallery.update_image(id, &input).await?;
        self.invalidate_cache().await;

        self.gallery
            .get_image_by_id(id)
            .await?
            .ok_or(GalleryServiceError::NotFound)
    }

    /// Delete an image and, when it lives under the upload directory, its
    /// file on disk. A missing file is not an error.
    pub async fn delete_image(&self, id: i64) -> Result<(), GalleryServiceError> {
        let image = self
            .gallery
            .get_image_by_id(id)
            .await?
            .ok_or(GalleryServiceError::NotFound)?;

        self.gallery.delete_image(id).await?;
        self.invalidate_cache().await;

        if let Some(file_path) = self.uploaded_file_path(&image.url) {
            match tokio::fs::remove_file(&file_path).await {
                Ok(()) => debug!(path = %file_path.display(), "Removed gallery image file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %file_path.display(), error = %e, "Failed to remove image file")
                }
            }
        }

        Ok(())
    }

    /// Map an /uploads URL to its on-disk path, rejecting anything that
    /// would escape the upload directory.
    fn uploaded_file_path(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(UPLOADS_URL_PREFIX)?;
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return None;
        }
        Some(self.upload_path.join(relative))
    }

    async fn invalidate_cache(&self) {
        self.cache.delete_prefix(CACHE_PREFIX).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::repositories::SqlxGalleryRepository;
    use crate::db::create_test_pool;
    use tempfile::TempDir;

    async fn setup() -> (GalleryService, TempDir) {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");

        let uploads = TempDir::new().expect("Failed to create temp dir");
        let service = GalleryService::new(
            SqlxGalleryRepository::boxed(pool),
            Arc::new(MemoryCache::new()),
            uploads.path().to_path_buf(),
        );
        (service, uploads)
    }

    fn image_input(url: &str, group_id: Option<i64>) -> CreateImageInput {
        CreateImageInput {
            group_id,
            url: url.to_string(),
            alt_text: Some("alt".to_string()),
            caption: None,
            sort_order: None,
        }
    }

    #[tokio::test]
    async fn test_create_group_generates_slug() {
        let (service, _uploads) = setup().await;

        let group = service
            .create_group(CreateGroupInput {
                slug: None,
                name: "Brand Work".to_string(),
                description: None,
                sort_order: None,
            })
            .await
            .unwrap();
        assert_eq!(group.slug, "brand-work");

        // Same name gets a suffix
        let second = service
            .create_group(CreateGroupInput {
                slug: None,
                name: "Brand Work".to_string(),
                description: None,
                sort_order: None,
            })
            .await
            .unwrap();
        assert_eq!(second.slug, "brand-work-2");
    }

    #[tokio::test]
    async fn test_public_gallery_splits_streams() {
        let (service, _uploads) = setup().await;

        let group = service
            .create_group(CreateGroupInput {
                slug: None,
                name: "Posters".to_string(),
                description: None,
                sort_order: None,
            })
            .await
            .unwrap();

        service
            .add_image(image_input("/uploads/a.png", Some(group.id)))
            .await
            .unwrap();
        service
            .add_image(image_input("/uploads/b.png", None))
            .await
            .unwrap();

        let (groups, ungrouped) = service.public_gallery().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].images.len(), 1);
        assert_eq!(ungrouped.len(), 1);
        assert_eq!(ungrouped[0].url, "/uploads/b.png");
    }

    #[tokio::test]
    async fn test_delete_group_detaches_images() {
        let (service, _uploads) = setup().await;

        let group = service
            .create_group(CreateGroupInput {
                slug: None,
                name: "Temp".to_string(),
                description: None,
                sort_order: None,
            })
            .await
            .unwrap();
        let image = service
            .add_image(image_input("/uploads/kept.png", Some(group.id)))
            .await
            .unwrap();

        service.delete_group(group.id).await.unwrap();

        let images = service.list_images(None).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, image.id);
        assert_eq!(images[0].group_id, None);
    }

    #[tokio::test]
    async fn test_update_image_detach_and_move() {
        let (service, _uploads) = setup().await;

        let group = service
            .create_group(CreateGroupInput {
                slug: None,
                name: "Group".to_string(),
                description: None,
                sort_order: None,
            })
            .await
            .unwrap();
        let image = service
            .add_image(image_input("/uploads/img.png", Some(group.id)))
            .await
            .unwrap();

        // Explicit null detaches
        let updated = service
            .update_image(
                image.id,
                UpdateImageInput {
                    group_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.group_id, None);

        // Absent group_id leaves attachment alone
        let updated = service
            .update_image(
                image.id,
                UpdateImageInput {
                    caption: Some("A caption".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.group_id, None);
        assert_eq!(updated.caption.as_deref(), Some("A caption"));
    }

    #[tokio::test]
    async fn test_delete_image_removes_file() {
        let (service, uploads) = setup().await;

        let file_path = uploads.path().join("shot.png");
        tokio::fs::write(&file_path, b"png-bytes").await.unwrap();

        let image = service
            .add_image(image_input("/uploads/shot.png", None))
            .await
            .unwrap();
        service.delete_image(image.id).await.unwrap();

        assert!(!file_path.exists());
        assert!(service.list_images(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_image_missing_file_ok() {
        let (service, _uploads) = setup().await;

        let image = service
            .add_image(image_input("/uploads/gone.png", None))
            .await
            .unwrap();
        assert!(service.delete_image(image.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_uploaded_file_path_rejects_traversal() {
        let (service, uploads) = setup().await;

        assert_eq!(service.uploaded_file_path("/uploads/../secret"), None);
        assert_eq!(service.uploaded_file_path("https://cdn.example/x.png"), None);
        assert_eq!(
            service.uploaded_file_path("/uploads/ok.png"),
            Some(uploads.path().join("ok.png"))
        );
    }
}
