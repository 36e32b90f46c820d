//! Session repository
//!
//! Database operations for console sessions.

use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    async fn create(&self, session: &Session) -> Result<()>;

    /// Get session by ID (token)
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// Delete a session (logout)
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete all sessions for a user
    async fn delete_by_user(&self, user_id: i64) -> Result<()>;

    /// Delete sessions that expired before the given instant
    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: SqlitePool,
}

impl SqlxSessionRepository {
    /// Create a new SQLx session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create session")?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get session")?;

        Ok(row.map(|r| Session {
            id: r.get("id"),
            user_id: r.get("user_id"),
            expires_at: r.get("expires_at"),
            created_at: r.get("created_at"),
        }))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user sessions")?;
        Ok(())
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(before)
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;

    async fn setup() -> (SqlitePool, SqlxSessionRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxSessionRepository::new(pool.clone());
        (pool, repo)
    }

    async fn create_test_user(pool: &SqlitePool) -> i64 {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, role) VALUES (?, ?, ?, ?)",
        )
        .bind("admin")
        .bind("admin@example.com")
        .bind("hash123")
        .bind("admin")
        .execute(pool)
        .await
        .expect("Failed to create test user");
        result.last_insert_rowid()
    }

    fn test_session(id: &str, user_id: i64, ttl_hours: i64) -> Session {
        let now = Utc::now();
        Session {
            id: id.to_string(),
            user_id,
            expires_at: now + Duration::hours(ttl_hours),
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (pool, repo) = setup().await;
        let user_id = create_test_user(&pool).await;

        repo.create(&test_session("tok1", user_id, 24))
            .await
            .expect("Failed to create session");

        let found = repo
            .get_by_id("tok1")
            .await
            .expect("Failed to get session")
            .expect("Session not found");
        assert_eq!(found.user_id, user_id);
        assert!(!found.is_expired());
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let (pool, repo) = setup().await;
        let user_id = create_test_user(&pool).await;

        repo.create(&test_session("live", user_id, 24))
            .await
            .expect("Failed to create session");
        repo.create(&test_session("dead", user_id, -1))
            .await
            .expect("Failed to create session");

        let removed = repo
            .delete_expired(Utc::now())
            .await
            .expect("Failed to delete expired");
        assert_eq!(removed, 1);

        assert!(repo.get_by_id("live").await.unwrap().is_some());
        assert!(repo.get_by_id("dead").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_user() {
        let (pool, repo) = setup().await;
        let user_id = create_test_user(&pool).await;

        repo.create(&test_session("a", user_id, 24)).await.unwrap();
        repo.create(&test_session("b", user_id, 24)).await.unwrap();

        repo.delete_by_user(user_id).await.expect("Failed to delete");

        assert!(repo.get_by_id("a").await.unwrap().is_none());
        assert!(repo.get_by_id("b").await.unwrap().is_none());
    }
}
