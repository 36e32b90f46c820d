//! Blog post endpoints
//!
//! Public:
//! - GET /api/v1/posts - Published posts, paginated
//! - GET /api/v1/posts/{slug} - One published post
//!
//! Admin:
//! - GET    /api/v1/admin/posts - All posts with filters
//! - POST   /api/v1/admin/posts - Create
//! - GET    /api/v1/admin/posts/{id} - Fetch for editing
//! - PUT    /api/v1/admin/posts/{id} - Update
//! - DELETE /api/v1/admin/posts/{id} - Delete
//! - PATCH  /api/v1/admin/posts/bulk - Bulk status change
//! - DELETE /api/v1/admin/posts/bulk - Bulk delete

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::list_params;
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{AffectedResponse, ApiResponse, Paginated};
use crate::models::{
    BulkPostAction, CreatePostInput, Post, PostFilter, PostStatus, PostWithMeta, UpdatePostInput,
};

/// Public post routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published))
        .route("/{slug}", get(get_published))
}

/// Admin post routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create))
        .route("/bulk", patch(bulk_action).delete(bulk_delete))
        .route("/{id}", get(get_by_id).put(update).delete(delete))
}

/// Query parameters for the public post list
#[derive(Debug, Deserialize)]
struct PublicListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
    /// Category slug
    category: Option<String>,
    /// Tag slug
    tag: Option<String>,
    search: Option<String>,
}

/// GET /api/v1/posts - Published posts
async fn list_published(
    State(state): State<AppState>,
    Query(query): Query<PublicListQuery>,
) -> Result<Json<ApiResponse<Paginated<PostWithMeta>>>, ApiError> {
    let category_id = match &query.category {
        Some(slug) => Some(state.category_service.get_by_slug(slug).await?.id),
        None => None,
    };

    let filter = PostFilter {
        status: Some(PostStatus::Published),
        category_id,
        author_id: None,
        tag: query.tag,
        search: query.search,
    };

    let result = state
        .post_service
        .list_published(filter, list_params(query.page, query.per_page))
        .await?;

    Ok(Json(ApiResponse::new(result.into())))
}

/// GET /api/v1/posts/{slug} - One published post
async fn get_published(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<PostWithMeta>>, ApiError> {
    let post = state.post_service.get_published_by_slug(&slug).await?;
    Ok(Json(ApiResponse::new(post)))
}

/// Query parameters for the admin post list
#[derive(Debug, Deserialize)]
struct AdminListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
    status: Option<PostStatus>,
    category_id: Option<i64>,
    author_id: Option<i64>,
    tag: Option<String>,
    search: Option<String>,
}

/// GET /api/v1/admin/posts - All posts with filters
async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ApiResponse<Paginated<PostWithMeta>>>, ApiError> {
    let filter = PostFilter {
        status: query.status,
        category_id: query.category_id,
        author_id: query.author_id,
        tag: query.tag,
        search: query.search,
    };

    let result = state
        .post_service
        .list(filter, list_params(query.page, query.per_page))
        .await?;

    Ok(Json(ApiResponse::new(result.into())))
}

/// POST /api/v1/admin/posts - Create a post
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.post_service.create(input).await?;

    if post.status == PostStatus::Published {
        state.indexing_service.notify_published();
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::new(post))))
}

/// GET /api/v1/admin/posts/{id} - Fetch a post for editing
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    let post = state.post_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::new(post)))
}

/// PUT /api/v1/admin/posts/{id} - Update a post
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    let publishing = input.status == Some(PostStatus::Published);
    let post = state.post_service.update(id, input).await?;

    if publishing {
        state.indexing_service.notify_published();
    }

    Ok(Json(ApiResponse::new(post)))
}

/// DELETE /api/v1/admin/posts/{id} - Delete a post
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.post_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for bulk status changes
#[derive(Debug, Deserialize)]
struct BulkActionRequest {
    ids: Vec<i64>,
    action: BulkPostAction,
}

/// PATCH /api/v1/admin/posts/bulk - Apply a status to several posts
async fn bulk_action(
    State(state): State<AppState>,
    Json(body): Json<BulkActionRequest>,
) -> Result<Json<ApiResponse<AffectedResponse>>, ApiError> {
    let affected = state
        .post_service
        .bulk_action(&body.ids, body.action)
        .await?;

    if body.action == BulkPostAction::Publish && affected > 0 {
        state.indexing_service.notify_published();
    }

    Ok(Json(ApiResponse::new(AffectedResponse { affected })))
}

/// Request body for bulk deletion
#[derive(Debug, Deserialize)]
struct BulkDeleteRequest {
    ids: Vec<i64>,
}

/// DELETE /api/v1/admin/posts/bulk - Delete several posts
async fn bulk_delete(
    State(state): State<AppState>,
    Json(body): Json<BulkDeleteRequest>,
) -> Result<Json<ApiResponse<AffectedResponse>>, ApiError> {
    let affected = state.post_service.bulk_delete(&body.ids).await?;
    Ok(Json(ApiResponse::new(AffectedResponse { affected })))
}
