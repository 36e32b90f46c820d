//! Category repository
//!
//! Database operations for blog categories.

use crate::models::{Category, CategoryWithCount, UpdateCategoryInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List all categories ordered by name
    async fn list(&self) -> Result<Vec<Category>>;

    /// List categories with published-post counts
    async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>>;

    /// Update a category
    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<()>;

    /// Delete a category (posts keep a null category via ON DELETE SET NULL)
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check whether a slug is already taken, optionally excluding one category
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO categories (slug, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&category.slug)
        .bind(&category.name)
        .bind(&category.description)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create category")?;

        let mut created = category.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, slug, name, description, created_at FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get category by ID")?;

        Ok(row.map(|r| row_to_category(&r)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, slug, name, description, created_at FROM categories WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get category by slug")?;

        Ok(row.map(|r| row_to_category(&r)))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, slug, name, description, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.slug, c.name, c.description, c.created_at,
                   COUNT(p.id) as post_count
            FROM categories c
            LEFT JOIN posts p ON p.category_id = c.id AND p.status = 'published'
            GROUP BY c.id, c.slug, c.name, c.description, c.created_at
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories with counts")?;

        Ok(rows
            .iter()
            .map(|r| CategoryWithCount {
                category: row_to_category(r),
                post_count: r.get("post_count"),
            })
            .collect())
    }

    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE categories SET
                slug = COALESCE(?, slug),
                name = COALESCE(?, name),
                description = COALESCE(?, description)
            WHERE id = ?
            "#,
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update category")?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;
        Ok(())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM categories WHERE slug = ? AND id != COALESCE(?, -1)",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check category slug")?;
        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (SqlitePool, SqlxCategoryRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxCategoryRepository::new(pool.clone());
        (pool, repo)
    }

    fn test_category(slug: &str, name: &str) -> Category {
        Category {
            id: 0,
            slug: slug.to_string(),
            name: name.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (_pool, repo) = setup().await;

        repo.create(&test_category("branding", "Branding")).await.unwrap();
        repo.create(&test_category("analytics", "Analytics")).await.unwrap();

        let categories = repo.list().await.expect("Failed to list");
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Analytics");
    }

    #[tokio::test]
    async fn test_counts_only_published_posts() {
        let (pool, repo) = setup().await;
        let cat = repo.create(&test_category("branding", "Branding")).await.unwrap();

        sqlx::query("INSERT INTO authors (slug, name) VALUES ('a', 'A')")
            .execute(&pool)
            .await
            .unwrap();
        for (slug, status) in [("p1", "published"), ("p2", "draft")] {
            sqlx::query(
                "INSERT INTO posts (slug, title, content, author_id, category_id, status) VALUES (?, ?, 'b', 1, ?, ?)",
            )
            .bind(slug)
            .bind(slug)
            .bind(cat.id)
            .bind(status)
            .execute(&pool)
            .await
            .unwrap();
        }

        let counts = repo.list_with_counts().await.expect("Failed to list");
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].post_count, 1);
    }

    #[tokio::test]
    async fn test_delete_nulls_post_category() {
        let (pool, repo) = setup().await;
        let cat = repo.create(&test_category("branding", "Branding")).await.unwrap();

        sqlx::query("INSERT INTO authors (slug, name) VALUES ('a', 'A')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO posts (slug, title, content, author_id, category_id) VALUES ('p', 'P', 'b', 1, ?)",
        )
        .bind(cat.id)
        .execute(&pool)
        .await
        .unwrap();

        repo.delete(cat.id).await.expect("Failed to delete");

        let row = sqlx::query("SELECT category_id FROM posts WHERE slug = 'p'")
            .fetch_one(&pool)
            .await
            .unwrap();
        let category_id: Option<i64> = row.get("category_id");
        assert!(category_id.is_none());
    }
}
