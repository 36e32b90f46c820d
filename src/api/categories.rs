//! Category endpoints
//!
//! Public:
//! - GET /api/v1/categories - Categories with published-post counts
//!
//! Admin:
//! - GET    /api/v1/admin/categories - All categories
//! - POST   /api/v1/admin/categories - Create
//! - PUT    /api/v1/admin/categories/{id} - Update
//! - DELETE /api/v1/admin/categories/{id} - Delete (posts become uncategorized)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::{Category, CategoryWithCount, CreateCategoryInput, UpdateCategoryInput};

/// Public category routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_with_counts))
}

/// Admin category routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", axum::routing::put(update).delete(delete))
}

/// GET /api/v1/categories - Categories with published-post counts
async fn list_with_counts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryWithCount>>>, ApiError> {
    let categories = state.category_service.list_with_counts().await?;
    Ok(Json(ApiResponse::new(categories)))
}

/// GET /api/v1/admin/categories - All categories
async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    let categories = state.category_service.list().await?;
    Ok(Json(ApiResponse::new(categories)))
}

/// POST /api/v1/admin/categories - Create a category
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.category_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(category))))
}

/// PUT /api/v1/admin/categories/{id} - Update a category
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateCategoryInput>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    let category = state.category_service.update(id, input).await?;
    Ok(Json(ApiResponse::new(category)))
}

/// DELETE /api/v1/admin/categories/{id} - Delete a category
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.category_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
