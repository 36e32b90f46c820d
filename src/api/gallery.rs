//! Gallery endpoints
//!
//! Public:
//! - GET /api/v1/gallery - Groups with images plus the ungrouped stream
//!
//! Admin:
//! - GET    /api/v1/admin/gallery/groups - All groups
//! - POST   /api/v1/admin/gallery/groups - Create a group
//! - DELETE /api/v1/admin/gallery/groups/{id} - Delete (images detach)
//! - GET    /api/v1/admin/gallery/images - Images, optionally by group
//! - POST   /api/v1/admin/gallery/images - Register an uploaded image
//! - PUT    /api/v1/admin/gallery/images/{id} - Caption, reorder, or move
//! - DELETE /api/v1/admin/gallery/images/{id} - Delete (removes the file)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::{
    CreateGroupInput, CreateImageInput, GalleryGroup, GalleryGroupWithImages, GalleryImage,
    UpdateImageInput,
};

/// Public gallery routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(public_gallery))
}

/// Admin gallery routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{id}", axum::routing::delete(delete_group))
        .route("/images", get(list_images).post(add_image))
        .route(
            "/images/{id}",
            axum::routing::put(update_image).delete(delete_image),
        )
}

/// Public gallery payload: grouped collections plus the default stream
#[derive(Debug, Serialize)]
struct PublicGalleryResponse {
    groups: Vec<GalleryGroupWithImages>,
    ungrouped: Vec<GalleryImage>,
}

/// GET /api/v1/gallery - The whole public gallery
async fn public_gallery(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PublicGalleryResponse>>, ApiError> {
    let (groups, ungrouped) = state.gallery_service.public_gallery().await?;
    Ok(Json(ApiResponse::new(PublicGalleryResponse {
        groups,
        ungrouped,
    })))
}

/// GET /api/v1/admin/gallery/groups - All groups
async fn list_groups(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<GalleryGroup>>>, ApiError> {
    let groups = state.gallery_service.list_groups().await?;
    Ok(Json(ApiResponse::new(groups)))
}

/// POST /api/v1/admin/gallery/groups - Create a group
async fn create_group(
    State(state): State<AppState>,
    Json(input): Json<CreateGroupInput>,
) -> Result<impl IntoResponse, ApiError> {
    let group = state.gallery_service.create_group(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(group))))
}

/// DELETE /api/v1/admin/gallery/groups/{id} - Delete a group
async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.gallery_service.delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for the image list
#[derive(Debug, Deserialize)]
struct ImageListQuery {
    group_id: Option<i64>,
}

/// GET /api/v1/admin/gallery/images - Images, optionally by group
async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ImageListQuery>,
) -> Result<Json<ApiResponse<Vec<GalleryImage>>>, ApiError> {
    let images = state.gallery_service.list_images(query.group_id).await?;
    Ok(Json(ApiResponse::new(images)))
}

/// POST /api/v1/admin/gallery/images - Register an uploaded image
async fn add_image(
    State(state): State<AppState>,
    Json(input): Json<CreateImageInput>,
) -> Result<impl IntoResponse, ApiError> {
    let image = state.gallery_service.add_image(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(image))))
}

/// PUT /api/v1/admin/gallery/images/{id} - Caption, reorder, or move
async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateImageInput>,
) -> Result<Json<ApiResponse<GalleryImage>>, ApiError> {
    let image = state.gallery_service.update_image(id, input).await?;
    Ok(Json(ApiResponse::new(image)))
}

/// DELETE /api/v1/admin/gallery/images/{id} - Delete an image
async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.gallery_service.delete_image(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
