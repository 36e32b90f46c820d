//! Authentication endpoints
//!
//! - POST /api/v1/auth/login - Console login
//! - POST /api/v1/auth/logout - Invalidate the session
//! - GET  /api/v1/auth/me - Current account

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::api::common::client_ip;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::ApiResponse;
use crate::models::User;

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for successful login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Routes that do not require a session
pub fn public_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Routes behind `require_auth`
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// POST /api/v1/auth/login - Console login
async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ip = client_ip(&headers, addr);

    let (session, user) = state
        .user_service
        .login(&body.username_or_email, &body.password, ip)
        .await?;

    // Also set an HttpOnly cookie so browser clients do not have to manage
    // the token themselves.
    let max_age = state.config.admin.session_expiration_days * 24 * 60 * 60;
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.id, max_age
    );

    let mut response_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response_headers.insert(header::SET_COOKIE, value);
    }

    Ok((
        response_headers,
        Json(ApiResponse::new(AuthResponse {
            user,
            token: session.id,
        })),
    ))
}

/// POST /api/v1/auth/logout - Invalidate the session
async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| {
                    s.split(';')
                        .map(|c| c.trim())
                        .find_map(|c| c.strip_prefix("session="))
                })
        })
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state.user_service.logout(token).await?;

    let clear_cookie = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";
    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, HeaderValue::from_static(clear_cookie));

    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /api/v1/auth/me - Current account
async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Json<ApiResponse<User>> {
    Json(ApiResponse::new(user))
}
