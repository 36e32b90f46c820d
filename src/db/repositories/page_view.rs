//! Page view repository
//!
//! Recording is de-duplicated by the `(path, visitor_ip, viewed_on)` unique
//! constraint with `ON CONFLICT DO NOTHING`, so repeat views within a day
//! are acknowledged without a second row. Aggregation buckets by day, ISO
//! week, or month using SQLite's strftime.

use crate::models::{AnalyticsBucket, PathViewCount, ViewBucket, ViewSummary};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Page view repository trait
#[async_trait]
pub trait PageViewRepository: Send + Sync {
    /// Record a view; returns true if a new row was inserted
    async fn record(&self, path: &str, visitor_ip: &str, viewed_on: NaiveDate) -> Result<bool>;

    /// Bucketed unique-view series over a date range (inclusive)
    async fn views_over_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        bucket: AnalyticsBucket,
        path: Option<&str>,
    ) -> Result<Vec<ViewBucket>>;

    /// Most-viewed paths over a date range (inclusive)
    async fn top_paths(&self, from: NaiveDate, to: NaiveDate, limit: usize)
        -> Result<Vec<PathViewCount>>;

    /// Headline figures over a date range (inclusive)
    async fn summary(&self, from: NaiveDate, to: NaiveDate) -> Result<ViewSummary>;
}

/// SQLx-based page view repository implementation
pub struct SqlxPageViewRepository {
    pool: SqlitePool,
}

impl SqlxPageViewRepository {
    /// Create a new SQLx page view repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PageViewRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PageViewRepository for SqlxPageViewRepository {
    async fn record(&self, path: &str, visitor_ip: &str, viewed_on: NaiveDate) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO page_views (path, visitor_ip, viewed_on)
            VALUES (?, ?, ?)
            ON CONFLICT (path, visitor_ip, viewed_on) DO NOTHING
            "#,
        )
        .bind(path)
        .bind(visitor_ip)
        .bind(viewed_on)
        .execute(&self.pool)
        .await
        .context("Failed to record page view")?;

        Ok(result.rows_affected() > 0)
    }

    async fn views_over_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        bucket: AnalyticsBucket,
        path: Option<&str>,
    ) -> Result<Vec<ViewBucket>> {
        let sql = format!(
            r#"
            SELECT strftime('{}', viewed_on) as bucket, COUNT(*) as views
            FROM page_views
            WHERE viewed_on >= ? AND viewed_on <= ?
              AND path = COALESCE(?, path)
            GROUP BY bucket
            ORDER BY bucket
            "#,
            bucket.strftime_format()
        );

        let rows = sqlx::query(&sql)
            .bind(from)
            .bind(to)
            .bind(path)
            .fetch_all(&self.pool)
            .await
            .context("Failed to aggregate page views")?;

        Ok(rows
            .iter()
            .map(|r| ViewBucket {
                bucket: r.get("bucket"),
                views: r.get("views"),
            })
            .collect())
    }

    async fn top_paths(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PathViewCount>> {
        let rows = sqlx::query(
            r#"
            SELECT path, COUNT(*) as views
            FROM page_views
            WHERE viewed_on >= ? AND viewed_on <= ?
            GROUP BY path
            ORDER BY views DESC, path
            LIMIT ?
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get top paths")?;

        Ok(rows
            .iter()
            .map(|r| PathViewCount {
                path: r.get("path"),
                views: r.get("views"),
            })
            .collect())
    }

    async fn summary(&self, from: NaiveDate, to: NaiveDate) -> Result<ViewSummary> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as total_views,
                   COUNT(DISTINCT visitor_ip) as unique_visitors,
                   COUNT(DISTINCT path) as paths_viewed
            FROM page_views
            WHERE viewed_on >= ? AND viewed_on <= ?
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .context("Failed to summarize page views")?;

        Ok(ViewSummary {
            total_views: row.get("total_views"),
            unique_visitors: row.get("unique_visitors"),
            paths_viewed: row.get("paths_viewed"),
        })
    }
}
