//! AI content generation endpoints (admin only)
//!
//! - POST /api/v1/admin/generate/post - Draft a blog post from a prompt
//! - POST /api/v1/admin/generate/offering - Draft a service offering
//! - POST /api/v1/admin/generate/image - Generate an image into uploads
//!
//! All endpoints return drafts for the console to edit; nothing is
//! persisted until the admin saves.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::services::{GeneratedOfferingDraft, GeneratedPostDraft};

/// Admin generation routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/post", post(generate_post))
        .route("/offering", post(generate_offering))
        .route("/image", post(generate_image))
}

/// Request body for all generation endpoints
#[derive(Debug, Deserialize)]
struct GenerateRequest {
    prompt: String,
}

/// POST /api/v1/admin/generate/post - Draft a blog post
async fn generate_post(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<GeneratedPostDraft>>, ApiError> {
    let draft = state.ai_service.generate_post(&body.prompt).await?;
    Ok(Json(ApiResponse::new(draft)))
}

/// POST /api/v1/admin/generate/offering - Draft a service offering
async fn generate_offering(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<GeneratedOfferingDraft>>, ApiError> {
    let draft = state.ai_service.generate_offering(&body.prompt).await?;
    Ok(Json(ApiResponse::new(draft)))
}

/// Response for image generation
#[derive(Debug, Serialize)]
struct GeneratedImageResponse {
    url: String,
}

/// POST /api/v1/admin/generate/image - Generate an image
async fn generate_image(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<GeneratedImageResponse>>, ApiError> {
    let url = state.ai_service.generate_image(&body.prompt).await?;
    Ok(Json(ApiResponse::new(GeneratedImageResponse { url })))
}
