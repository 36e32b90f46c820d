//! File upload endpoints (admin only)
//!
//! - POST /api/v1/admin/upload - Upload a single image
//! - POST /api/v1/admin/upload/batch - Upload several images
//!
//! Files land in the configured upload directory under a random name and
//! are served back at /uploads/{filename}.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;

/// Response for a stored file
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub content_type: String,
}

/// Response for a batch upload with per-file failures
#[derive(Debug, Serialize)]
pub struct BatchUploadResponse {
    pub files: Vec<UploadResponse>,
    pub failed: Vec<String>,
}

/// Admin upload routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_image))
        .route("/batch", post(upload_batch))
}

/// POST /api/v1/admin/upload - Upload a single image.
///
/// Accepts multipart/form-data with a file field named "file".
async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    let config = &state.config.upload;
    ensure_upload_dir(&config.path).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !config.is_type_allowed(&content_type) {
            return Err(ApiError::validation_error(format!(
                "File type not allowed: {}",
                content_type
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?;

        if data.len() as u64 > config.max_file_size {
            return Err(ApiError::validation_error(format!(
                "File too large, maximum is {} MB",
                config.max_file_size / 1024 / 1024
            )));
        }

        let stored = store_file(&config.path, &filename, &content_type, &data).await?;
        return Ok(Json(ApiResponse::new(stored)));
    }

    Err(ApiError::validation_error("No file provided"))
}

/// POST /api/v1/admin/upload/batch - Upload several images.
///
/// Accepts multipart/form-data with file fields named "files" (or "file").
/// Invalid files are skipped and reported in `failed`.
async fn upload_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<BatchUploadResponse>>, ApiError> {
    let config = &state.config.upload;
    ensure_upload_dir(&config.path).await?;

    let mut files = Vec::new();
    let mut failed = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        if !matches!(field.name(), Some("files") | Some("file")) {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !config.is_type_allowed(&content_type) {
            failed.push(format!("{}: type not allowed ({})", filename, content_type));
            continue;
        }

        let data = match field.bytes().await {
            Ok(d) => d,
            Err(e) => {
                failed.push(format!("{}: {}", filename, e));
                continue;
            }
        };

        if data.len() as u64 > config.max_file_size {
            failed.push(format!(
                "{}: too large (max {} MB)",
                filename,
                config.max_file_size / 1024 / 1024
            ));
            continue;
        }

        match store_file(&config.path, &filename, &content_type, &data).await {
            Ok(stored) => files.push(stored),
            Err(e) => failed.push(format!("{}: {}", filename, e.message)),
        }
    }

    Ok(Json(ApiResponse::new(BatchUploadResponse { files, failed })))
}

/// Write the bytes under a fresh UUID filename
async fn store_file(
    dir: &Path,
    original_name: &str,
    content_type: &str,
    data: &[u8],
) -> Result<UploadResponse, ApiError> {
    let ext = extension_for(original_name, content_type);
    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    let path = dir.join(&filename);

    fs::write(&path, data)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to save file: {}", e)))?;

    Ok(UploadResponse {
        url: format!("/uploads/{}", filename),
        filename,
        size: data.len() as u64,
        content_type: content_type.to_string(),
    })
}

/// Ensure the upload directory exists
async fn ensure_upload_dir(path: &Path) -> Result<(), ApiError> {
    if !path.exists() {
        fs::create_dir_all(path)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to create upload dir: {}", e)))?;
    }
    Ok(())
}

/// Pick a file extension from the original name, falling back to MIME type
fn extension_for(filename: &str, content_type: &str) -> String {
    if let Some((_, ext)) = filename.rsplit_once('.') {
        if !ext.is_empty() && ext.len() < 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return ext.to_lowercase();
        }
    }

    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
    .to_string()
}
