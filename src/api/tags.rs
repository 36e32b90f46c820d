//! Tag endpoints
//!
//! Public:
//! - GET /api/v1/tags - Tag cloud with usage counts
//!
//! Admin:
//! - GET    /api/v1/admin/tags - All tags
//! - DELETE /api/v1/admin/tags/{slug} - Delete a tag, detaching it from posts
//!
//! Tags are created implicitly when posts are saved, so there is no
//! create endpoint.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::{Tag, TagWithCount};

/// Public tag routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(cloud))
}

/// Admin tag routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{slug}", axum::routing::delete(delete))
}

/// Query parameters for the tag cloud
#[derive(Debug, Deserialize)]
struct CloudQuery {
    limit: Option<usize>,
}

/// GET /api/v1/tags - Tag cloud with usage counts
async fn cloud(
    State(state): State<AppState>,
    Query(query): Query<CloudQuery>,
) -> Result<Json<ApiResponse<Vec<TagWithCount>>>, ApiError> {
    let tags = state.tag_service.cloud(query.limit).await?;
    Ok(Json(ApiResponse::new(tags)))
}

/// GET /api/v1/admin/tags - All tags
async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Tag>>>, ApiError> {
    let tags = state.tag_service.list().await?;
    Ok(Json(ApiResponse::new(tags)))
}

/// DELETE /api/v1/admin/tags/{slug} - Delete a tag
async fn delete(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.tag_service.delete_by_slug(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
