//! Admin user model
//!
//! This module defines the User entity for console accounts. There is no
//! public registration: accounts are provisioned by an administrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Console account entity.
///
/// Users can be administrators (full access, including account management)
/// or editors (content management only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this function.
    /// Use `services::password::hash_password()` to hash the password.
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Console role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - full access, including account management
    Admin,
    /// Editor - content management only
    Editor,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Editor
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Editor => write!(f, "editor"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "editor" => Ok(UserRole::Editor),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Input for creating a new console account
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Plain-text password (hashed before storage)
    pub password: String,
    /// Role (defaults to Editor)
    pub role: Option<UserRole>,
}

/// Input for updating an existing console account
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    /// New email (optional)
    pub email: Option<String>,
    /// New plain-text password (optional, hashed before storage)
    pub password: Option<String>,
    /// New role (optional)
    pub role: Option<UserRole>,
}
