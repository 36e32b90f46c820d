//! Shared API response types
//!
//! All endpoints answer with the same envelope:
//! `{"success": true, "data": ..., "message": ...}` on success and
//! `{"success": false, "error": CODE, "message": ...}` on failure
//! (the failure shape lives in `middleware::ApiError`).

use serde::Serialize;

use crate::models::PagedResult;

/// Success envelope wrapping a response payload
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a payload in the success envelope
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Wrap a payload with an accompanying message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// Paginated list payload with navigation metadata
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T: Serialize> From<PagedResult<T>> for Paginated<T> {
    fn from(result: PagedResult<T>) -> Self {
        let total_pages = result.total_pages();
        let has_next = result.has_next();
        let has_prev = result.has_prev();
        Self {
            items: result.items,
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
            has_next,
            has_prev,
        }
    }
}

/// Payload for bulk operations: how many rows were affected
#[derive(Debug, Serialize)]
pub struct AffectedResponse {
    pub affected: u64,
}
