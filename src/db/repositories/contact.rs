//! Contact repository
//!
//! Database operations for contact-form submissions.

use crate::models::{ContactSubmission, ListParams, PagedResult, SubmissionStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

/// Contact repository trait
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Store a new submission
    async fn create(&self, submission: &ContactSubmission) -> Result<ContactSubmission>;

    /// Get submission by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<ContactSubmission>>;

    /// List submissions, newest first, optionally restricted to one status
    async fn list(
        &self,
        status: Option<SubmissionStatus>,
        params: &ListParams,
    ) -> Result<PagedResult<ContactSubmission>>;

    /// Update status and/or admin note
    async fn update(
        &self,
        id: i64,
        status: Option<SubmissionStatus>,
        admin_note: Option<&str>,
    ) -> Result<()>;

    /// Delete a submission
    async fn delete(&self, id: i64) -> Result<()>;

    /// Set the status of every submission in `ids`, returning the affected count
    async fn bulk_update_status(&self, ids: &[i64], status: SubmissionStatus) -> Result<u64>;

    /// Count submissions with the given status (for the dashboard badge)
    async fn count_by_status(&self, status: SubmissionStatus) -> Result<i64>;
}

/// SQLx-based contact repository implementation
pub struct SqlxContactRepository {
    pool: SqlitePool,
}

impl SqlxContactRepository {
    /// Create a new SQLx contact repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ContactRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ContactRepository for SqlxContactRepository {
    async fn create(&self, submission: &ContactSubmission) -> Result<ContactSubmission> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO contact_submissions
                (name, email, company, phone, message, status, admin_note, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.company)
        .bind(&submission.phone)
        .bind(&submission.message)
        .bind(submission.status.as_str())
        .bind(&submission.admin_note)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create submission")?;

        let mut created = submission.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactSubmission>> {
        let row = sqlx::query(
            "SELECT id, name, email, company, phone, message, status, admin_note, created_at, updated_at FROM contact_submissions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get submission")?;

        row.map(|r| row_to_submission(&r)).transpose()
    }

    async fn list(
        &self,
        status: Option<SubmissionStatus>,
        params: &ListParams,
    ) -> Result<PagedResult<ContactSubmission>> {
        let total: i64 = sqlx::query(
            "SELECT COUNT(*) as count FROM contact_submissions WHERE status = COALESCE(?, status)",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await
        .context("Failed to count submissions")?
        .get("count");

        let rows = sqlx::query(
            r#"
            SELECT id, name, email, company, phone, message, status, admin_note, created_at, updated_at
            FROM contact_submissions
            WHERE status = COALESCE(?, status)
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list submissions")?;

        let items = rows
            .iter()
            .map(row_to_submission)
            .collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn update(
        &self,
        id: i64,
        status: Option<SubmissionStatus>,
        admin_note: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE contact_submissions SET
                status = COALESCE(?, status),
                admin_note = COALESCE(?, admin_note),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(admin_note)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update submission")?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM contact_submissions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete submission")?;
        Ok(())
    }

    async fn bulk_update_status(&self, ids: &[i64], status: SubmissionStatus) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE contact_submissions SET status = ");
        qb.push_bind(status.as_str());
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
            .context("Failed to bulk update submissions")?;
        Ok(result.rows_affected())
    }

    async fn count_by_status(&self, status: SubmissionStatus) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM contact_submissions WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count submissions by status")?;
        Ok(row.get("count"))
    }
}

fn row_to_submission(row: &sqlx::sqlite::SqliteRow) -> Result<ContactSubmission> {
    let status_str: String = row.get("status");
    let status = SubmissionStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid submission status: {}", status_str))?;

    Ok(ContactSubmission {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        company: row.get("company"),
        phone: row.get("phone"),
        message: row.get("message"),
        status,
        admin_note: row.get("admin_note"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxContactRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxContactRepository::new(pool)
    }

    fn test_submission(name: &str) -> ContactSubmission {
        let now = Utc::now();
        ContactSubmission {
            id: 0,
            name: name.to_string(),
            email: format!("{}@example.com", name),
            company: None,
            phone: None,
            message: "Hello, we need a website.".to_string(),
            status: SubmissionStatus::New,
            admin_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_new() {
        let repo = setup().await;
        let created = repo.create(&test_submission("alice")).await.expect("Failed");

        let found = repo.get_by_id(created.id).await.unwrap().expect("Not found");
        assert_eq!(found.status, SubmissionStatus::New);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let repo = setup().await;
        let a = repo.create(&test_submission("a")).await.unwrap();
        repo.create(&test_submission("b")).await.unwrap();
        repo.update(a.id, Some(SubmissionStatus::Responded), None)
            .await
            .unwrap();

        let new_only = repo
            .list(Some(SubmissionStatus::New), &ListParams::default())
            .await
            .unwrap();
        assert_eq!(new_only.total, 1);
        assert_eq!(new_only.items[0].name, "b");

        let all = repo.list(None, &ListParams::default()).await.unwrap();
        assert_eq!(all.total, 2);
    }

    #[tokio::test]
    async fn test_bulk_update_status() {
        let repo = setup().await;
        let a = repo.create(&test_submission("a")).await.unwrap();
        let b = repo.create(&test_submission("b")).await.unwrap();
        repo.create(&test_submission("c")).await.unwrap();

        let affected = repo
            .bulk_update_status(&[a.id, b.id], SubmissionStatus::Read)
            .await
            .unwrap();
        assert_eq!(affected, 2);
        assert_eq!(
            repo.count_by_status(SubmissionStatus::New).await.unwrap(),
            1
        );
    }
}
