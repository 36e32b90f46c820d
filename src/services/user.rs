//! User service
//!
//! Console authentication and account management. There is no public
//! registration: `ensure_admin` provisions the first administrator at
//! startup, and further accounts are created through the admin API.
//! Login is throttled per username and per source IP.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, Session, UpdateUserInput, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use crate::services::rate_limiter::LoginRateLimiter;
use anyhow::Context;
use chrono::{Duration, Utc};
use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Minimum password length for new accounts
const MIN_PASSWORD_LENGTH: usize = 8;

/// User service errors
#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Too many attempts, try again later")]
    RateLimited,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("User not found")]
    NotFound,

    #[error("Operation not permitted: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for console accounts and sessions
pub struct UserService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    rate_limiter: Arc<LoginRateLimiter>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        rate_limiter: Arc<LoginRateLimiter>,
    ) -> Self {
        Self {
            users,
            sessions,
            rate_limiter,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        rate_limiter: Arc<LoginRateLimiter>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            users,
            sessions,
            rate_limiter,
            session_expiration_days,
        }
    }

    /// Ensure at least one administrator account exists.
    ///
    /// Called at startup with credentials from configuration. Does nothing
    /// when any account already exists, so a changed config password never
    /// overwrites a live account.
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, UserServiceError> {
        let count = self.users.count().await.context("Failed to count users")?;
        if count > 0 {
            return Ok(None);
        }

        let input = CreateUserInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Some(UserRole::Admin),
        };
        let user = self.create_user(input).await?;
        info!(username = %user.username, "Seeded initial admin account");
        Ok(Some(user))
    }

    /// Create a console account
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        self.validate_create_input(&input)?;

        if self
            .users
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        if self
            .users
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(
            input.username,
            input.email,
            password_hash,
            input.role.unwrap_or_default(),
        );

        Ok(self
            .users
            .create(&user)
            .await
            .context("Failed to create user")?)
    }

    /// Login with username or email.
    ///
    /// Failed attempts count against the username; all attempts count
    /// against the source IP.
    pub async fn login(
        &self,
        username_or_email: &str,
        password: &str,
        ip: IpAddr,
    ) -> Result<(Session, User), UserServiceError> {
        if self.rate_limiter.is_ip_limited(ip).await {
            warn!(%ip, "Login rejected: IP rate limited");
            return Err(UserServiceError::RateLimited);
        }
        self.rate_limiter.record_ip_request(ip).await;

        if self.rate_limiter.is_username_limited(username_or_email).await {
            warn!("Login rejected: username rate limited");
            return Err(UserServiceError::RateLimited);
        }

        let user = match self.find_by_username_or_email(username_or_email).await? {
            Some(user) => user,
            None => {
                self.rate_limiter
                    .record_failed_attempt(username_or_email)
                    .await;
                return Err(UserServiceError::AuthenticationError(
                    "Invalid username or password".to_string(),
                ));
            }
        };

        let valid = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            self.rate_limiter
                .record_failed_attempt(username_or_email)
                .await;
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        self.rate_limiter
            .clear_username_attempts(username_or_email)
            .await;

        let session = self.create_session(user.id).await?;
        Ok((session, user))
    }

    /// Logout (invalidate the session token)
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.sessions
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Validate a session token and return the associated user.
    ///
    /// Expired sessions are removed and treated as absent.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .sessions
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            let _ = self.sessions.delete(token).await;
            return Ok(None);
        }

        Ok(self
            .users
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?)
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<User, UserServiceError> {
        self.users
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound)
    }

    /// List all console accounts
    pub async fn list(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.users.list().await.context("Failed to list users")?)
    }

    /// Update a console account.
    ///
    /// Password changes invalidate every session of that user except the
    /// one performing the change (pass `None` to drop them all).
    pub async fn update_user(
        &self,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        let existing = self.get_by_id(id).await?;

        if let Some(email) = &input.email {
            if !email.contains('@') {
                return Err(UserServiceError::ValidationError(
                    "Invalid email format".to_string(),
                ));
            }
            if let Some(other) = self
                .users
                .get_by_email(email)
                .await
                .context("Failed to check email")?
            {
                if other.id != id {
                    return Err(UserServiceError::UserExists(format!(
                        "Email '{}' is already registered",
                        email
                    )));
                }
            }
        }

        let password_hash = match &input.password {
            Some(password) => {
                if password.len() < MIN_PASSWORD_LENGTH {
                    return Err(UserServiceError::ValidationError(format!(
                        "Password must be at least {} characters",
                        MIN_PASSWORD_LENGTH
                    )));
                }
                Some(hash_password(password).context("Failed to hash password")?)
            }
            None => None,
        };

        // Demoting the last admin would lock everyone out of account
        // management.
        if input.role == Some(UserRole::Editor) && existing.is_admin() {
            let admins = self
                .users
                .list()
                .await
                .context("Failed to list users")?
                .iter()
                .filter(|u| u.is_admin())
                .count();
            if admins <= 1 {
                return Err(UserServiceError::Forbidden(
                    "Cannot demote the last administrator".to_string(),
                ));
            }
        }

        self.users
            .update(
                id,
                input.email.as_deref(),
                password_hash.as_deref(),
                input.role,
            )
            .await
            .context("Failed to update user")?;

        if password_hash.is_some() {
            self.sessions
                .delete_by_user(id)
                .await
                .context("Failed to drop sessions")?;
        }

        self.get_by_id(id).await
    }

    /// Delete a console account
    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        let user = self.get_by_id(id).await?;

        if user.is_admin() {
            let admins = self
                .users
                .list()
                .await
                .context("Failed to list users")?
                .iter()
                .filter(|u| u.is_admin())
                .count();
            if admins <= 1 {
                return Err(UserServiceError::Forbidden(
                    "Cannot delete the last administrator".to_string(),
                ));
            }
        }

        self.users.delete(id).await.context("Failed to delete user")?;
        Ok(())
    }

    /// Delete all expired sessions, returning the number removed
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, UserServiceError> {
        Ok(self
            .sessions
            .delete_expired(Utc::now())
            .await
            .context("Failed to delete expired sessions")?)
    }

    fn validate_create_input(&self, input: &CreateUserInput) -> Result<(), UserServiceError> {
        if input.username.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "Invalid email format".to_string(),
            ));
        }
        if input.password.len() < MIN_PASSWORD_LENGTH {
            return Err(UserServiceError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }

    async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        if let Some(user) = self
            .users
            .get_by_username(username_or_email)
            .await
            .context("Failed to get user by username")?
        {
            return Ok(Some(user));
        }

        Ok(self
            .users
            .get_by_email(username_or_email)
            .await
            .context("Failed to get user by email")?)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        self.sessions
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::create_test_pool;
    use std::str::FromStr;

    fn test_ip() -> IpAddr {
        IpAddr::from_str("127.0.0.1").unwrap()
    }

    async fn setup() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");

        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
            Arc::new(LoginRateLimiter::new()),
        )
    }

    fn admin_input(username: &str, email: &str) -> CreateUserInput {
        CreateUserInput {
            username: username.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            role: Some(UserRole::Admin),
        }
    }

    #[tokio::test]
    async fn test_ensure_admin_seeds_once() {
        let service = setup().await;

        let seeded = service
            .ensure_admin("admin", "admin@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(seeded.unwrap().role, UserRole::Admin);

        // Second call is a no-op
        let again = service
            .ensure_admin("admin", "admin@example.com", "other-password")
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_create_user_defaults_to_editor() {
        let service = setup().await;

        let user = service
            .create_user(CreateUserInput {
                username: "editor".to_string(),
                email: "editor@example.com".to_string(),
                password: "password123".to_string(),
                role: None,
            })
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::Editor);
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_rejected() {
        let service = setup().await;

        service
            .create_user(admin_input("admin", "admin@example.com"))
            .await
            .unwrap();

        let result = service
            .create_user(admin_input("admin", "other@example.com"))
            .await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));

        let result = service
            .create_user(admin_input("other", "admin@example.com"))
            .await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let service = setup().await;

        let result = service
            .create_user(CreateUserInput {
                username: "user".to_string(),
                email: "user@example.com".to_string(),
                password: "short".to_string(),
                role: None,
            })
            .await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let service = setup().await;
        service
            .create_user(admin_input("admin", "admin@example.com"))
            .await
            .unwrap();

        let (session, user) = service
            .login("admin", "password123", test_ip())
            .await
            .unwrap();
        assert!(!session.is_expired());
        assert_eq!(user.username, "admin");

        let validated = service
            .validate_session(&session.id)
            .await
            .unwrap()
            .expect("Session should be valid");
        assert_eq!(validated.id, user.id);

        service.logout(&session.id).await.unwrap();
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_with_email() {
        let service = setup().await;
        service
            .create_user(admin_input("admin", "admin@example.com"))
            .await
            .unwrap();

        let result = service
            .login("admin@example.com", "password123", test_ip())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = setup().await;
        service
            .create_user(admin_input("admin", "admin@example.com"))
            .await
            .unwrap();

        let result = service.login("admin", "wrong-password", test_ip()).await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_login_locks_after_failures() {
        let service = setup().await;
        service
            .create_user(admin_input("admin", "admin@example.com"))
            .await
            .unwrap();

        // Spread attempts over distinct IPs so only the username counter
        // trips.
        for i in 0..5 {
            let ip = IpAddr::from_str(&format!("10.0.0.{}", i + 1)).unwrap();
            let _ = service.login("admin", "wrong-password", ip).await;
        }

        let result = service
            .login("admin", "password123", IpAddr::from_str("10.0.0.99").unwrap())
            .await;
        assert!(matches!(result, Err(UserServiceError::RateLimited)));
    }

    #[tokio::test]
    async fn test_expired_session_invalid() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");

        let service = UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
            Arc::new(LoginRateLimiter::new()),
            -1,
        );

        service
            .create_user(admin_input("admin", "admin@example.com"))
            .await
            .unwrap();
        let (session, _) = service
            .login("admin", "password123", test_ip())
            .await
            .unwrap();

        assert!(session.is_expired());
        assert!(service.validate_session(&session.id).await.unwrap().is_none());

        let removed = service.cleanup_expired_sessions().await.unwrap();
        // validate_session already dropped it
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn test_password_change_drops_sessions() {
        let service = setup().await;
        let user = service
            .create_user(admin_input("admin", "admin@example.com"))
            .await
            .unwrap();

        let (session, _) = service
            .login("admin", "password123", test_ip())
            .await
            .unwrap();

        service
            .update_user(
                user.id,
                UpdateUserInput {
                    password: Some("new-password-456".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(service.validate_session(&session.id).await.unwrap().is_none());

        let result = service
            .login("admin", "new-password-456", test_ip())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_last_admin_protected() {
        let service = setup().await;
        let admin = service
            .create_user(admin_input("admin", "admin@example.com"))
            .await
            .unwrap();

        let result = service.delete_user(admin.id).await;
        assert!(matches!(result, Err(UserServiceError::Forbidden(_))));

        let result = service
            .update_user(
                admin.id,
                UpdateUserInput {
                    role: Some(UserRole::Editor),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(UserServiceError::Forbidden(_))));

        // A second admin unblocks both operations
        service
            .create_user(admin_input("admin2", "admin2@example.com"))
            .await
            .unwrap();
        assert!(service.delete_user(admin.id).await.is_ok());
    }
}
