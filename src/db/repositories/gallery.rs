//! Gallery repository
//!
//! Database operations for gallery groups and images.

use crate::models::{GalleryGroup, GalleryGroupWithImages, GalleryImage, UpdateImageInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Gallery repository trait
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    /// Create a group
    async fn create_group(&self, group: &GalleryGroup) -> Result<GalleryGroup>;

    /// Get group by slug
    async fn get_group_by_slug(&self, slug: &str) -> Result<Option<GalleryGroup>>;

    /// List groups in display order
    async fn list_groups(&self) -> Result<Vec<GalleryGroup>>;

    /// List groups with their images attached
    async fn list_groups_with_images(&self) -> Result<Vec<GalleryGroupWithImages>>;

    /// Delete a group; its images are detached, not deleted
    async fn delete_group(&self, id: i64) -> Result<()>;

    /// Register an image
    async fn create_image(&self, image: &GalleryImage) -> Result<GalleryImage>;

    /// Get image by ID
    async fn get_image_by_id(&self, id: i64) -> Result<Option<GalleryImage>>;

    /// List images, optionally restricted to one group (None lists all)
    async fn list_images(&self, group_id: Option<i64>) -> Result<Vec<GalleryImage>>;

    /// Update an image
    async fn update_image(&self, id: i64, input: &UpdateImageInput) -> Result<()>;

    /// Delete an image row (the file on disk is handled by the service)
    async fn delete_image(&self, id: i64) -> Result<()>;
}

/// SQLx-based gallery repository implementation
pub struct SqlxGalleryRepository {
    pool: SqlitePool,
}

impl SqlxGalleryRepository {
    /// Create a new SQLx gallery repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn GalleryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl GalleryRepository for SqlxGalleryRepository {
    async fn create_group(&self, group: &GalleryGroup) -> Result<GalleryGroup> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO gallery_groups (slug, name, description, sort_order, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&group.slug)
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.sort_order)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create gallery group")?;

        let mut created = group.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn get_group_by_slug(&self, slug: &str) -> Result<Option<GalleryGroup>> {
        let row = sqlx::query(
            "SELECT id, slug, name, description, sort_order, created_at FROM gallery_groups WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get gallery group")?;

        Ok(row.map(|r| row_to_group(&r)))
    }

    async fn list_groups(&self) -> Result<Vec<GalleryGroup>> {
        let rows = sqlx::query(
            "SELECT id, slug, name, description, sort_order, created_at FROM gallery_groups ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list gallery groups")?;

        Ok(rows.iter().map(row_to_group).collect())
    }

    async fn list_groups_with_images(&self) -> Result<Vec<GalleryGroupWithImages>> {
        let groups = self.list_groups().await?;
        let mut result = Vec::with_capacity(groups.len());
        for group in groups {
            let images = self.list_images(Some(group.id)).await?;
            result.push(GalleryGroupWithImages { group, images });
        }
        Ok(result)
    }

    async fn delete_group(&self, id: i64) -> Result<()> {
        // Images fall back to the default stream via ON DELETE SET NULL
        sqlx::query("DELETE FROM gallery_groups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete gallery group")?;
        Ok(())
    }

    async fn create_image(&self, image: &GalleryImage) -> Result<GalleryImage> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO gallery_images (group_id, url, alt_text, caption, sort_order, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(image.group_id)
        .bind(&image.url)
        .bind(&image.alt_text)
        .bind(&image.caption)
        .bind(image.sort_order)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create gallery image")?;

        let mut created = image.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn get_image_by_id(&self, id: i64) -> Result<Option<GalleryImage>> {
        let row = sqlx::query(
            "SELECT id, group_id, url, alt_text, caption, sort_order, created_at FROM gallery_images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get gallery image")?;

        Ok(row.map(|r| row_to_image(&r)))
    }

    async fn list_images(&self, group_id: Option<i64>) -> Result<Vec<GalleryImage>> {
        let rows = match group_id {
            Some(group_id) => {
                sqlx::query(
                    "SELECT id, group_id, url, alt_text, caption, sort_order, created_at FROM gallery_images WHERE group_id = ? ORDER BY sort_order, id",
                )
                .bind(group_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, group_id, url, alt_text, caption, sort_order, created_at FROM gallery_images ORDER BY sort_order, id",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list gallery images")?;

        Ok(rows.iter().map(row_to_image).collect())
    }

    async fn update_image(&self, id: i64, input: &UpdateImageInput) -> Result<()> {
        // group_id is a double option: absent keeps, null detaches
        if let Some(group_id) = input.group_id {
            sqlx::query("UPDATE gallery_images SET group_id = ? WHERE id = ?")
                .bind(group_id)
                .bind(id)
                .execute(&self.pool)
                .await
                .context("Failed to move gallery image")?;
        }

        sqlx::query(
            r#"
            UPDATE gallery_images SET
                alt_text = COALESCE(?, alt_text),
                caption = COALESCE(?, caption),
                sort_order = COALESCE(?, sort_order)
            WHERE id = ?
            "#,
        )
        .bind(&input.alt_text)
        .bind(&input.caption)
        .bind(input.sort_order)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update gallery image")?;

        Ok(())
    }

    async fn delete_image(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM gallery_images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete gallery image")?;
        Ok(())
    }
}

fn row_to_group(row: &sqlx::sqlite::SqliteRow) -> GalleryGroup {
    GalleryGroup {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        description: row.get("description"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    }
}

fn row_to_image(row: &sqlx::sqlite::SqliteRow) -> GalleryImage {
    GalleryImage {
        id: row.get("id"),
        group_id: row.get("group_id"),
        url: row.get("url"),
        alt_text: row.get("alt_text"),
        caption: row.get("caption"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxGalleryRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxGalleryRepository::new(pool)
    }

    fn test_group(slug: &str) -> GalleryGroup {
        GalleryGroup {
            id: 0,
            slug: slug.to_string(),
            name: format!("Group {}", slug),
            description: None,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    fn test_image(group_id: Option<i64>, url: &str) -> GalleryImage {
        GalleryImage {
            id: 0,
            group_id,
            url: url.to_string(),
            alt_text: None,
            caption: None,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_group_with_images() {
        let repo = setup().await;
        let group = repo.create_group(&test_group("work")).await.unwrap();
        repo.create_image(&test_image(Some(group.id), "/uploads/a.jpg"))
            .await
            .unwrap();
        repo.create_image(&test_image(None, "/uploads/loose.jpg"))
            .await
            .unwrap();

        let groups = repo.list_groups_with_images().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].images.len(), 1);
        assert_eq!(groups[0].images[0].url, "/uploads/a.jpg");
    }

    #[tokio::test]
    async fn test_delete_group_detaches_images() {
        let repo = setup().await;
        let group = repo.create_group(&test_group("work")).await.unwrap();
        let image = repo
            .create_image(&test_image(Some(group.id), "/uploads/a.jpg"))
            .await
            .unwrap();

        repo.delete_group(group.id).await.unwrap();

        let found = repo.get_image_by_id(image.id).await.unwrap().expect("Image gone");
        assert!(found.group_id.is_none());
    }

    #[tokio::test]
    async fn test_update_image_detach_via_null() {
        let repo = setup().await;
        let group = repo.create_group(&test_group("work")).await.unwrap();
        let image = repo
            .create_image(&test_image(Some(group.id), "/uploads/a.jpg"))
            .await
            .unwrap();

        let input = UpdateImageInput {
            group_id: Some(None),
            ..Default::default()
        };
        repo.update_image(image.id, &input).await.unwrap();

        let found = repo.get_image_by_id(image.id).await.unwrap().unwrap();
        assert!(found.group_id.is_none());

        // Absent group_id leaves the association alone
        let input = UpdateImageInput {
            alt_text: Some("alt".to_string()),
            ..Default::default()
        };
        repo.update_image(image.id, &input).await.unwrap();
        let found = repo.get_image_by_id(image.id).await.unwrap().unwrap();
        assert_eq!(found.alt_text.as_deref(), Some("alt"));
    }
}
