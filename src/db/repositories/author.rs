//! Author repository
//!
//! Database operations for byline profiles.

use crate::models::{Author, UpdateAuthorInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Author repository trait
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Create a new author
    async fn create(&self, author: &Author) -> Result<Author>;

    /// Get author by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Author>>;

    /// Get author by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Author>>;

    /// List all authors ordered by name
    async fn list(&self) -> Result<Vec<Author>>;

    /// Update an author
    async fn update(&self, id: i64, input: &UpdateAuthorInput) -> Result<()>;

    /// Delete an author
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count posts that reference the author (any status)
    async fn count_posts(&self, id: i64) -> Result<i64>;

    /// Check whether a slug is already taken, optionally excluding one author
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;
}

/// SQLx-based author repository implementation
pub struct SqlxAuthorRepository {
    pool: SqlitePool,
}

impl SqlxAuthorRepository {
    /// Create a new SQLx author repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn AuthorRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AuthorRepository for SqlxAuthorRepository {
    async fn create(&self, author: &Author) -> Result<Author> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO authors (slug, name, bio, avatar_url, email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&author.slug)
        .bind(&author.name)
        .bind(&author.bio)
        .bind(&author.avatar_url)
        .bind(&author.email)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create author")?;

        let mut created = author.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Author>> {
        let row = sqlx::query(
            "SELECT id, slug, name, bio, avatar_url, email, created_at, updated_at FROM authors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get author by ID")?;

        Ok(row.map(|r| row_to_author(&r)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Author>> {
        let row = sqlx::query(
            "SELECT id, slug, name, bio, avatar_url, email, created_at, updated_at FROM authors WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get author by slug")?;

        Ok(row.map(|r| row_to_author(&r)))
    }

    async fn list(&self) -> Result<Vec<Author>> {
        let rows = sqlx::query(
            "SELECT id, slug, name, bio, avatar_url, email, created_at, updated_at FROM authors ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list authors")?;

        Ok(rows.iter().map(row_to_author).collect())
    }

    async fn update(&self, id: i64, input: &UpdateAuthorInput) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE authors SET
                slug = COALESCE(?, slug),
                name = COALESCE(?, name),
                bio = COALESCE(?, bio),
                avatar_url = COALESCE(?, avatar_url),
                email = COALESCE(?, email),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.bio)
        .bind(&input.avatar_url)
        .bind(&input.email)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update author")?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete author")?;
        Ok(())
    }

    async fn count_posts(&self, id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE author_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count author posts")?;
        Ok(row.get("count"))
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM authors WHERE slug = ? AND id != COALESCE(?, -1)",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check author slug")?;
        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

fn row_to_author(row: &sqlx::sqlite::SqliteRow) -> Author {
    Author {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        bio: row.get("bio"),
        avatar_url: row.get("avatar_url"),
        email: row.get("email"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
