//! Author endpoints
//!
//! Public:
//! - GET /api/v1/authors - All authors
//! - GET /api/v1/authors/{slug} - One author profile
//!
//! Admin:
//! - POST   /api/v1/admin/authors - Create
//! - PUT    /api/v1/admin/authors/{id} - Update
//! - DELETE /api/v1/admin/authors/{id} - Delete (refused while posts remain)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::{Author, CreateAuthorInput, UpdateAuthorInput};

/// Public author routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{slug}", get(get_by_slug))
}

/// Admin author routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", axum::routing::put(update).delete(delete))
}

/// GET /api/v1/authors - All authors
async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Author>>>, ApiError> {
    let authors = state.author_service.list().await?;
    Ok(Json(ApiResponse::new(authors)))
}

/// GET /api/v1/authors/{slug} - One author profile
async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Author>>, ApiError> {
    let author = state.author_service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::new(author)))
}

/// POST /api/v1/admin/authors - Create an author
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateAuthorInput>,
) -> Result<impl IntoResponse, ApiError> {
    let author = state.author_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(author))))
}

/// PUT /api/v1/admin/authors/{id} - Update an author
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateAuthorInput>,
) -> Result<Json<ApiResponse<Author>>, ApiError> {
    let author = state.author_service.update(id, input).await?;
    Ok(Json(ApiResponse::new(author)))
}

/// DELETE /api/v1/admin/authors/{id} - Delete an author
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.author_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
