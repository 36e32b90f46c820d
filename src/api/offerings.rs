//! Service offering endpoints
//!
//! Public:
//! - GET /api/v1/offerings - Published offerings
//! - GET /api/v1/offerings/{slug} - One published offering with sub-content
//!
//! Admin:
//! - GET    /api/v1/admin/offerings - All offerings
//! - POST   /api/v1/admin/offerings - Create
//! - GET    /api/v1/admin/offerings/{id} - Full detail for editing
//! - PUT    /api/v1/admin/offerings/{id} - Update
//! - DELETE /api/v1/admin/offerings/{id} - Delete

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::{CreateOfferingInput, Offering, OfferingDetail, UpdateOfferingInput};

/// Public offering routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published))
        .route("/{slug}", get(get_published))
}

/// Admin offering routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create))
        .route("/{id}", get(get_detail).put(update).delete(delete))
}

/// GET /api/v1/offerings - Published offerings
async fn list_published(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Offering>>>, ApiError> {
    let offerings = state.offering_service.list_published().await?;
    Ok(Json(ApiResponse::new(offerings)))
}

/// GET /api/v1/offerings/{slug} - One published offering
async fn get_published(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<OfferingDetail>>, ApiError> {
    let detail = state.offering_service.get_published_by_slug(&slug).await?;
    Ok(Json(ApiResponse::new(detail)))
}

/// GET /api/v1/admin/offerings - All offerings, any status
async fn list_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Offering>>>, ApiError> {
    let offerings = state.offering_service.list().await?;
    Ok(Json(ApiResponse::new(offerings)))
}

/// POST /api/v1/admin/offerings - Create an offering
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateOfferingInput>,
) -> Result<impl IntoResponse, ApiError> {
    let offering = state.offering_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(offering))))
}

/// GET /api/v1/admin/offerings/{id} - Full detail for editing
async fn get_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OfferingDetail>>, ApiError> {
    let detail = state.offering_service.get_detail(id).await?;
    Ok(Json(ApiResponse::new(detail)))
}

/// PUT /api/v1/admin/offerings/{id} - Update an offering
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateOfferingInput>,
) -> Result<Json<ApiResponse<OfferingDetail>>, ApiError> {
    let detail = state.offering_service.update(id, input).await?;
    Ok(Json(ApiResponse::new(detail)))
}

/// DELETE /api/v1/admin/offerings/{id} - Delete an offering
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.offering_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
