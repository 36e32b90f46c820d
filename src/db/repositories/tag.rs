//! Tag repository
//!
//! Database operations for tags and their post associations.

use crate::models::{Tag, TagWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, tag: &Tag) -> Result<Tag>;

    /// Get tag by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    /// Get tag by name (case-insensitive)
    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// List all tags ordered by name
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Get tags with published-post counts, most used first
    async fn list_with_counts(&self, limit: usize) -> Result<Vec<TagWithCount>>;

    /// Delete a tag
    async fn delete(&self, id: i64) -> Result<()>;

    /// Replace the tag set of a post
    async fn set_post_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()>;

    /// Get tags for a post, ordered by name
    async fn get_by_post_id(&self, post_id: i64) -> Result<Vec<Tag>>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        let now = Utc::now();

        let result = sqlx::query("INSERT INTO tags (slug, name, created_at) VALUES (?, ?, ?)")
            .bind(&tag.slug)
            .bind(&tag.name)
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to create tag")?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            slug: tag.slug.clone(),
            name: tag.name.clone(),
            created_at: now,
        })
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, slug, name, created_at FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by slug")?;

        Ok(row.map(|r| row_to_tag(&r)))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "SELECT id, slug, name, created_at FROM tags WHERE name = ? COLLATE NOCASE",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get tag by name")?;

        Ok(row.map(|r| row_to_tag(&r)))
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, slug, name, created_at FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn list_with_counts(&self, limit: usize) -> Result<Vec<TagWithCount>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.slug, t.name, t.created_at, COUNT(p.id) as post_count
            FROM tags t
            LEFT JOIN post_tags pt ON t.id = pt.tag_id
            LEFT JOIN posts p ON p.id = pt.post_id AND p.status = 'published'
            GROUP BY t.id, t.slug, t.name, t.created_at
            ORDER BY post_count DESC, t.name ASC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get tags with counts")?;

        Ok(rows
            .iter()
            .map(|r| TagWithCount {
                tag: row_to_tag(r),
                post_count: r.get("post_count"),
            })
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        // post_tags rows go with it via ON DELETE CASCADE
        sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete tag")?;
        Ok(())
    }

    async fn set_post_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear post tags")?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("Failed to attach tag")?;
        }

        tx.commit().await.context("Failed to commit post tags")?;
        Ok(())
    }

    async fn get_by_post_id(&self, post_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.slug, t.name, t.created_at
            FROM tags t
            INNER JOIN post_tags pt ON t.id = pt.tag_id
            WHERE pt.post_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get tags by post")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}
