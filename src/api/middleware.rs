//! API middleware and shared HTTP plumbing
//!
//! This module provides:
//! - `AppState` holding the wired services behind the router
//! - `ApiError` with a consistent JSON error envelope
//! - Session token extraction from Bearer header or cookie
//! - `require_auth` / `require_admin` middleware

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::models::User;
use crate::services::{
    AiService, AiServiceError, AnalyticsService, AnalyticsServiceError, AuthorService,
    AuthorServiceError, CategoryService, CategoryServiceError, ContactService,
    ContactServiceError, EmailService, EmailServiceError, GalleryService, GalleryServiceError,
    IndexingService, OfferingService, OfferingServiceError, PostService, PostServiceError,
    TagService, TagServiceError, UserService, UserServiceError,
};

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<MemoryCache>,
    pub user_service: Arc<UserService>,
    pub post_service: Arc<PostService>,
    pub author_service: Arc<AuthorService>,
    pub category_service: Arc<CategoryService>,
    pub tag_service: Arc<TagService>,
    pub offering_service: Arc<OfferingService>,
    pub contact_service: Arc<ContactService>,
    pub gallery_service: Arc<GalleryService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub email_service: Arc<EmailService>,
    pub ai_service: Arc<AiService>,
    pub indexing_service: Arc<IndexingService>,
}

/// Authenticated user extracted from the session token.
///
/// Inserted into request extensions by `require_auth`.
#[derive(Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// API error with a machine-readable code and a human-readable message.
///
/// Serialized as `{"success": false, "error": CODE, "message": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self {
            code: "VALIDATION_ERROR",
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            code: "FORBIDDEN",
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "NOT_FOUND",
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: "CONFLICT",
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            code: "RATE_LIMITED",
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self {
            code: "SERVICE_UNAVAILABLE",
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR",
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code {
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "CONFLICT" => StatusCode::CONFLICT,
            "RATE_LIMITED" => StatusCode::TOO_MANY_REQUESTS,
            "SERVICE_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.message, "Internal API error");
        }

        let body = json!({
            "success": false,
            "error": self.code,
            "message": self.message,
        });

        (status, Json(body)).into_response()
    }
}

impl From<PostServiceError> for ApiError {
    fn from(e: PostServiceError) -> Self {
        match e {
            PostServiceError::NotFound => ApiError::not_found("Post not found"),
            PostServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            PostServiceError::DuplicateSlug(slug) => {
                ApiError::conflict(format!("Slug already exists: {}", slug))
            }
            PostServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
            UserServiceError::RateLimited => {
                ApiError::rate_limited("Too many attempts, try again later")
            }
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::UserExists(msg) => ApiError::conflict(msg),
            UserServiceError::NotFound => ApiError::not_found("User not found"),
            UserServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            UserServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<AuthorServiceError> for ApiError {
    fn from(e: AuthorServiceError) -> Self {
        match e {
            AuthorServiceError::NotFound => ApiError::not_found("Author not found"),
            AuthorServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            AuthorServiceError::DuplicateSlug(slug) => {
                ApiError::conflict(format!("Slug already exists: {}", slug))
            }
            AuthorServiceError::HasPosts(count) => ApiError::conflict(format!(
                "Author has {} posts; reassign them before deleting",
                count
            )),
            AuthorServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<CategoryServiceError> for ApiError {
    fn from(e: CategoryServiceError) -> Self {
        match e {
            CategoryServiceError::NotFound => ApiError::not_found("Category not found"),
            CategoryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CategoryServiceError::DuplicateSlug(slug) => {
                ApiError::conflict(format!("Slug already exists: {}", slug))
            }
            CategoryServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<TagServiceError> for ApiError {
    fn from(e: TagServiceError) -> Self {
        match e {
            TagServiceError::NotFound(slug) => {
                ApiError::not_found(format!("Tag not found: {}", slug))
            }
            TagServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<OfferingServiceError> for ApiError {
    fn from(e: OfferingServiceError) -> Self {
        match e {
            OfferingServiceError::NotFound => ApiError::not_found("Offering not found"),
            OfferingServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            OfferingServiceError::DuplicateSlug(slug) => {
                ApiError::conflict(format!("Slug already exists: {}", slug))
            }
            OfferingServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<ContactServiceError> for ApiError {
    fn from(e: ContactServiceError) -> Self {
        match e {
            ContactServiceError::NotFound => ApiError::not_found("Submission not found"),
            ContactServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ContactServiceError::EmailError(e) => e.into(),
            ContactServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<EmailServiceError> for ApiError {
    fn from(e: EmailServiceError) -> Self {
        match e {
            EmailServiceError::Disabled => {
                ApiError::service_unavailable("Email sending is not configured")
            }
            EmailServiceError::RateLimited(recipient) => {
                ApiError::rate_limited(format!("Rate limited: {}", recipient))
            }
            EmailServiceError::InvalidAddress(addr) => {
                ApiError::validation_error(format!("Invalid email address: {}", addr))
            }
            EmailServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<GalleryServiceError> for ApiError {
    fn from(e: GalleryServiceError) -> Self {
        match e {
            GalleryServiceError::NotFound => ApiError::not_found("Not found"),
            GalleryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            GalleryServiceError::DuplicateSlug(slug) => {
                ApiError::conflict(format!("Slug already exists: {}", slug))
            }
            GalleryServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<AnalyticsServiceError> for ApiError {
    fn from(e: AnalyticsServiceError) -> Self {
        match e {
            AnalyticsServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            AnalyticsServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<AiServiceError> for ApiError {
    fn from(e: AiServiceError) -> Self {
        match e {
            AiServiceError::Disabled => {
                ApiError::service_unavailable("AI generation is not configured")
            }
            AiServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            AiServiceError::ProviderError(msg) => {
                ApiError::internal_error(format!("Provider error: {}", msg))
            }
            AiServiceError::MalformedResponse(msg) => {
                ApiError::internal_error(format!("Could not understand the model response: {}", msg))
            }
            AiServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

/// Extract the session token from a request.
///
/// Checks the Authorization Bearer header first, then the `session` cookie.
pub fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Middleware that requires a valid session.
///
/// Inserts `AuthenticatedUser` into request extensions on success.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Middleware that requires the authenticated user to be an administrator.
///
/// Must run after `require_auth`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_admin() {
        return Err(ApiError::forbidden("Administrator access required"));
    }

    Ok(next.run(request).await)
}
