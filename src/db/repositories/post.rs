//! Post repository
//!
//! Database operations for blog posts: filtered admin lists, public
//! published lists, slug checks, and bulk status/delete over an id set.

use crate::models::{
    ListParams, PagedResult, Post, PostFilter, PostStatus, PostWithMeta, UpdatePostInput,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Get post by slug with author/category/tag metadata
    async fn get_with_meta_by_slug(&self, slug: &str) -> Result<Option<PostWithMeta>>;

    /// List posts matching a filter, newest first
    async fn list(&self, filter: &PostFilter, params: &ListParams)
        -> Result<PagedResult<PostWithMeta>>;

    /// Update a post
    async fn update(
        &self,
        id: i64,
        input: &UpdatePostInput,
        content_html: Option<&str>,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Delete a post
    async fn delete(&self, id: i64) -> Result<()>;

    /// Set the status of every post in `ids`, returning the affected count
    async fn bulk_update_status(&self, ids: &[i64], status: PostStatus) -> Result<u64>;

    /// Delete every post in `ids`, returning the affected count
    async fn bulk_delete(&self, ids: &[i64]) -> Result<u64>;

    /// Check whether a slug is already taken, optionally excluding one post
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// List slugs of recently published posts, for related-content and feeds
    async fn list_published_slugs(&self, limit: usize) -> Result<Vec<String>>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }

    async fn tags_for_post(&self, post_id: i64) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT t.name FROM tags t
            INNER JOIN post_tags pt ON t.id = pt.tag_id
            WHERE pt.post_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load post tags")?;

        Ok(rows.iter().map(|r| r.get("name")).collect())
    }
}

const POST_COLUMNS: &str = "p.id, p.slug, p.title, p.excerpt, p.content, p.content_html, \
    p.author_id, p.category_id, p.status, p.featured_image, p.seo_title, p.seo_description, \
    p.published_at, p.created_at, p.updated_at";

/// Append the filter's WHERE conditions to a query builder.
///
/// The builder must already contain a `WHERE 1=1` (or equivalent) so every
/// condition can be appended uniformly with `AND`.
fn push_filter_conditions<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a PostFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND p.status = ").push_bind(status.as_str());
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND p.author_id = ").push_bind(author_id);
    }
    if let Some(tag) = &filter.tag {
        qb.push(
            " AND p.id IN (SELECT pt.post_id FROM post_tags pt \
             INNER JOIN tags t ON t.id = pt.tag_id WHERE t.slug = ",
        )
        .push_bind(tag.as_str())
        .push(")");
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (p.title LIKE ")
            .push_bind(pattern.clone())
            .push(" COLLATE NOCASE OR p.excerpt LIKE ")
            .push_bind(pattern)
            .push(" COLLATE NOCASE)");
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO posts (
                slug, title, excerpt, content, content_html, author_id, category_id,
                status, featured_image, seo_title, seo_description, published_at,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.content_html)
        .bind(post.author_id)
        .bind(post.category_id)
        .bind(post.status.as_str())
        .bind(&post.featured_image)
        .bind(&post.seo_title)
        .bind(&post.seo_description)
        .bind(post.published_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        let mut created = post.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let sql = format!("SELECT {} FROM posts p WHERE p.id = ?", POST_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post by ID")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let sql = format!("SELECT {} FROM posts p WHERE p.slug = ?", POST_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post by slug")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn get_with_meta_by_slug(&self, slug: &str) -> Result<Option<PostWithMeta>> {
        let sql = format!(
            r#"
            SELECT {}, a.name as author_name, a.slug as author_slug,
                   c.name as category_name, c.slug as category_slug
            FROM posts p
            LEFT JOIN authors a ON a.id = p.author_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.slug = ?
            "#,
            POST_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post with meta")?;

        let Some(row) = row else { return Ok(None) };
        let post = row_to_post(&row)?;
        let tags = self.tags_for_post(post.id).await?;
        Ok(Some(PostWithMeta {
            post,
            author_name: row.get("author_name"),
            author_slug: row.get("author_slug"),
            category_name: row.get("category_name"),
            category_slug: row.get("category_slug"),
            tags,
        }))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        params: &ListParams,
    ) -> Result<PagedResult<PostWithMeta>> {
        let mut count_qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) as count FROM posts p WHERE 1=1");
        push_filter_conditions(&mut count_qb, filter);
        let total: i64 = count_qb
            .build()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts")?
            .get("count");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            r#"
            SELECT {}, a.name as author_name, a.slug as author_slug,
                   c.name as category_name, c.slug as category_slug
            FROM posts p
            LEFT JOIN authors a ON a.id = p.author_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE 1=1
            "#,
            POST_COLUMNS
        ));
        push_filter_conditions(&mut qb, filter);
        qb.push(" ORDER BY COALESCE(p.published_at, p.created_at) DESC, p.id DESC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts")?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let post = row_to_post(&row)?;
            let tags = self.tags_for_post(post.id).await?;
            items.push(PostWithMeta {
                post,
                author_name: row.get("author_name"),
                author_slug: row.get("author_slug"),
                category_name: row.get("category_name"),
                category_slug: row.get("category_slug"),
                tags,
            });
        }

        Ok(PagedResult::new(items, total, params))
    }

    async fn update(
        &self,
        id: i64,
        input: &UpdatePostInput,
        content_html: Option<&str>,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts SET
                slug = COALESCE(?, slug),
                title = COALESCE(?, title),
                excerpt = COALESCE(?, excerpt),
                content = COALESCE(?, content),
                content_html = COALESCE(?, content_html),
                author_id = COALESCE(?, author_id),
                category_id = COALESCE(?, category_id),
                status = COALESCE(?, status),
                featured_image = COALESCE(?, featured_image),
                seo_title = COALESCE(?, seo_title),
                seo_description = COALESCE(?, seo_description),
                published_at = COALESCE(?, published_at),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(content_html)
        .bind(input.author_id)
        .bind(input.category_id)
        .bind(input.status.map(|s| s.as_str()))
        .bind(&input.featured_image)
        .bind(&input.seo_title)
        .bind(&input.seo_description)
        .bind(published_at)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;
        Ok(())
    }

    async fn bulk_update_status(&self, ids: &[i64], status: PostStatus) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let published_at = if status == PostStatus::Published {
            Some(Utc::now())
        } else {
            None
        };

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE posts SET status = ");
        qb.push_bind(status.as_str());
        // First publish stamps published_at; re-publishing keeps the original date
        if published_at.is_some() {
            qb.push(", published_at = COALESCE(published_at, ")
                .push_bind(published_at)
                .push(")");
        }
        qb.push(", updated_at = ").push_bind(Utc::now());
        qb.push(" WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .context("Failed to bulk update post status")?;
        Ok(result.rows_affected())
    }

    async fn bulk_delete(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM posts WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .context("Failed to bulk delete posts")?;
        Ok(result.rows_affected())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM posts WHERE slug = ? AND id != COALESCE(?, -1)",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check post slug")?;
        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn list_published_slugs(&self, limit: usize) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT slug FROM posts WHERE status = 'published' ORDER BY published_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list published slugs")?;

        Ok(rows.iter().map(|r| r.get("slug")).collect())
    }
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let status_str: String = row.get("status");
    let status = PostStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid post status: {}", status_str))?;

    Ok(Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        content_html: row.get("content_html"),
        author_id: row.get("author_id"),
        category_id: row.get("category_id"),
        status,
        featured_image: row.get("featured_image"),
        seo_title: row.get("seo_title"),
        seo_description: row.get("seo_description"),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (SqlitePool, SqlxPostRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        sqlx::query("INSERT INTO authors (slug, name) VALUES ('jane', 'Jane')")
            .execute(&pool)
            .await
            .expect("Failed to seed author");
        let repo = SqlxPostRepository::new(pool.clone());
        (pool, repo)
    }

    fn test_post(slug: &str, status: PostStatus) -> Post {
        let now = Utc::now();
        Post {
            id: 0,
            slug: slug.to_string(),
            title: format!("Title {}", slug),
            excerpt: None,
            content: "body".to_string(),
            content_html: "<p>body</p>".to_string(),
            author_id: 1,
            category_id: None,
            status,
            featured_image: None,
            seo_title: None,
            seo_description: None,
            published_at: if status == PostStatus::Published {
                Some(now)
            } else {
                None
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_pool, repo) = setup().await;

        let created = repo
            .create(&test_post("hello", PostStatus::Draft))
            .await
            .expect("Failed to create post");
        assert!(created.id > 0);

        let found = repo
            .get_by_slug("hello")
            .await
            .expect("Failed to get post")
            .expect("Post not found");
        assert_eq!(found.status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (_pool, repo) = setup().await;
        repo.create(&test_post("p1", PostStatus::Published)).await.unwrap();
        repo.create(&test_post("p2", PostStatus::Draft)).await.unwrap();
        repo.create(&test_post("p3", PostStatus::Published)).await.unwrap();

        let filter = PostFilter {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        let result = repo
            .list(&filter, &ListParams::default())
            .await
            .expect("Failed to list posts");

        assert_eq!(result.total, 2);
        assert_eq!(result.items.len(), 2);
        assert!(result
            .items
            .iter()
            .all(|p| p.post.status == PostStatus::Published));
    }

    #[tokio::test]
    async fn test_list_search_matches_title() {
        let (_pool, repo) = setup().await;
        let mut post = test_post("branding", PostStatus::Published);
        post.title = "Rebranding Your Agency".to_string();
        repo.create(&post).await.unwrap();
        repo.create(&test_post("other", PostStatus::Published)).await.unwrap();

        let filter = PostFilter {
            search: Some("rebranding".to_string()),
            ..Default::default()
        };
        let result = repo.list(&filter, &ListParams::default()).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].post.slug, "branding");
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let (_pool, repo) = setup().await;
        for i in 0..15 {
            repo.create(&test_post(&format!("p{}", i), PostStatus::Published))
                .await
                .unwrap();
        }

        let result = repo
            .list(&PostFilter::default(), &ListParams::new(2, 10))
            .await
            .expect("Failed to list");
        assert_eq!(result.total, 15);
        assert_eq!(result.items.len(), 5);
        assert_eq!(result.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_bulk_update_status_sets_published_at_once() {
        let (_pool, repo) = setup().await;
        let a = repo.create(&test_post("a", PostStatus::Draft)).await.unwrap();
        let b = repo.create(&test_post("b", PostStatus::Draft)).await.unwrap();

        let affected = repo
            .bulk_update_status(&[a.id, b.id], PostStatus::Published)
            .await
            .expect("Failed to bulk update");
        assert_eq!(affected, 2);

        let first = repo.get_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(first.status, PostStatus::Published);
        let original_published = first.published_at.expect("published_at should be set");

        // Unpublish then publish again; the original date survives
        repo.bulk_update_status(&[a.id], PostStatus::Draft).await.unwrap();
        repo.bulk_update_status(&[a.id], PostStatus::Published).await.unwrap();
        let again = repo.get_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(again.published_at, Some(original_published));
    }

    #[tokio::test]
    async fn test_bulk_delete() {
        let (_pool, repo) = setup().await;
        let a = repo.create(&test_post("a", PostStatus::Draft)).await.unwrap();
        let b = repo.create(&test_post("b", PostStatus::Draft)).await.unwrap();
        let keep = repo.create(&test_post("keep", PostStatus::Draft)).await.unwrap();

        let affected = repo.bulk_delete(&[a.id, b.id]).await.expect("Failed to delete");
        assert_eq!(affected, 2);
        assert!(repo.get_by_id(keep.id).await.unwrap().is_some());
        assert!(repo.get_by_id(a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_empty_ids_is_noop() {
        let (_pool, repo) = setup().await;
        assert_eq!(
            repo.bulk_update_status(&[], PostStatus::Published).await.unwrap(),
            0
        );
        assert_eq!(repo.bulk_delete(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_slug_exists() {
        let (_pool, repo) = setup().await;
        let post = repo.create(&test_post("hello", PostStatus::Draft)).await.unwrap();

        assert!(repo.slug_exists("hello", None).await.unwrap());
        assert!(!repo.slug_exists("hello", Some(post.id)).await.unwrap());
        assert!(!repo.slug_exists("missing", None).await.unwrap());
    }
}
