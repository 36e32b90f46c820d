//! Console account management endpoints (administrators only)
//!
//! - GET    /api/v1/admin/users - All accounts
//! - POST   /api/v1/admin/users - Create an account
//! - PUT    /api/v1/admin/users/{id} - Update email, password, or role
//! - DELETE /api/v1/admin/users/{id} - Delete (the last admin is protected)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::{CreateUserInput, UpdateUserInput, User};

/// Admin user routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", axum::routing::put(update).delete(delete))
}

/// GET /api/v1/admin/users - All accounts
async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = state.user_service.list().await?;
    Ok(Json(ApiResponse::new(users)))
}

/// POST /api/v1/admin/users - Create an account
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(user))))
}

/// PUT /api/v1/admin/users/{id} - Update email, password, or role
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateUserInput>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.user_service.update_user(id, input).await?;
    Ok(Json(ApiResponse::new(user)))
}

/// DELETE /api/v1/admin/users/{id} - Delete an account
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
