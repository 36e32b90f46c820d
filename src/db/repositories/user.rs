//! User repository
//!
//! Database operations for console accounts.

use crate::models::{User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List all users
    async fn list(&self) -> Result<Vec<User>>;

    /// Update email, password hash and/or role
    async fn update(
        &self,
        id: i64,
        email: Option<&str>,
        password_hash: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<()>;

    /// Delete a user
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count users (used to decide whether to seed the first admin)
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        let mut created = user.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, role, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by ID")?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, role, created_at, updated_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by username")?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, role, created_at, updated_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by email")?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, username, email, password_hash, role, created_at, updated_at FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        rows.iter().map(row_to_user).collect()
    }

    async fn update(
        &self,
        id: i64,
        email: Option<&str>,
        password_hash: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash),
                role = COALESCE(?, role),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role.map(|r| r.to_string()))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user")?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;
        Ok(row.get("count"))
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: UserRole::from_str(&role_str)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn test_user(username: &str) -> User {
        User::new(
            username.to_string(),
            format!("{}@example.com", username),
            "hash123".to_string(),
            UserRole::Editor,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = setup_test_repo().await;

        let created = repo.create(&test_user("alice")).await.expect("Failed to create");
        assert!(created.id > 0);

        let found = repo
            .get_by_username("alice")
            .await
            .expect("Failed to get")
            .expect("User not found");
        assert_eq!(found.id, created.id);
        assert_eq!(found.role, UserRole::Editor);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = setup_test_repo().await;

        repo.create(&test_user("alice")).await.expect("Failed to create");
        let mut dup = test_user("alice");
        dup.email = "other@example.com".to_string();
        assert!(repo.create(&dup).await.is_err());
    }

    #[tokio::test]
    async fn test_update_role() {
        let repo = setup_test_repo().await;
        let created = repo.create(&test_user("alice")).await.expect("Failed to create");

        repo.update(created.id, None, None, Some(UserRole::Admin))
            .await
            .expect("Failed to update");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get")
            .expect("User not found");
        assert_eq!(found.role, UserRole::Admin);
        // Untouched fields survive the COALESCE update
        assert_eq!(found.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_count_users() {
        let repo = setup_test_repo().await;
        assert_eq!(repo.count().await.expect("Failed to count"), 0);

        repo.create(&test_user("alice")).await.expect("Failed to create");
        assert_eq!(repo.count().await.expect("Failed to count"), 1);
    }
}
