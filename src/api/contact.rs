//! Contact submission endpoints
//!
//! Public:
//! - POST /api/v1/contact - Submit the contact form
//!
//! Admin:
//! - GET    /api/v1/admin/contact - Submissions, filterable by status
//! - GET    /api/v1/admin/contact/unread-count - Count of new submissions
//! - GET    /api/v1/admin/contact/{id} - Open one (marks it read)
//! - PUT    /api/v1/admin/contact/{id} - Update status or internal note
//! - POST   /api/v1/admin/contact/{id}/reply - Email a reply to the sender
//! - PATCH  /api/v1/admin/contact/bulk - Apply a status to several submissions
//! - POST   /api/v1/admin/contact/bulk-reply - Same reply to several senders
//! - DELETE /api/v1/admin/contact/{id} - Delete

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::list_params;
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{AffectedResponse, ApiResponse, Paginated};
use crate::models::{
    ContactSubmission, CreateSubmissionInput, SubmissionStatus, UpdateSubmissionInput,
};
use crate::services::{BulkSendOutcome, BulkSendResult};

/// Public contact routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", post(submit))
}

/// Admin contact routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/unread-count", get(unread_count))
        .route("/bulk", patch(bulk_update))
        .route("/bulk-reply", post(bulk_reply))
        .route("/{id}", get(open).put(update).delete(delete))
        .route("/{id}/reply", post(reply))
}

/// POST /api/v1/contact - Submit the contact form
async fn submit(
    State(state): State<AppState>,
    Json(input): Json<CreateSubmissionInput>,
) -> Result<impl IntoResponse, ApiError> {
    let submission = state.contact_service.submit(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            submission,
            "Thanks for reaching out; we'll get back to you soon.",
        )),
    ))
}

/// Query parameters for the submission list
#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
    status: Option<SubmissionStatus>,
}

/// GET /api/v1/admin/contact - Submissions, newest first
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Paginated<ContactSubmission>>>, ApiError> {
    let result = state
        .contact_service
        .list(query.status, list_params(query.page, query.per_page))
        .await?;
    Ok(Json(ApiResponse::new(result.into())))
}

/// GET /api/v1/admin/contact/unread-count - Count of new submissions
async fn unread_count(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let count = state.contact_service.unread_count().await?;
    Ok(Json(ApiResponse::new(serde_json::json!({ "count": count }))))
}

/// GET /api/v1/admin/contact/{id} - Open a submission.
///
/// A new submission transitions to read on first open.
async fn open(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ContactSubmission>>, ApiError> {
    let submission = state.contact_service.open(id).await?;
    Ok(Json(ApiResponse::new(submission)))
}

/// PUT /api/v1/admin/contact/{id} - Update status or the internal note
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateSubmissionInput>,
) -> Result<Json<ApiResponse<ContactSubmission>>, ApiError> {
    let submission = state.contact_service.update(id, input).await?;
    Ok(Json(ApiResponse::new(submission)))
}

/// Request body for a reply
#[derive(Debug, Deserialize)]
struct ReplyRequest {
    subject: String,
    body: String,
}

/// POST /api/v1/admin/contact/{id}/reply - Email a reply to the sender
async fn reply(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ReplyRequest>,
) -> Result<Json<ApiResponse<ContactSubmission>>, ApiError> {
    let submission = state
        .contact_service
        .reply(id, &body.subject, &body.body)
        .await?;
    Ok(Json(ApiResponse::with_message(submission, "Reply sent")))
}

/// Request body for bulk status changes
#[derive(Debug, Deserialize)]
struct BulkUpdateRequest {
    ids: Vec<i64>,
    status: SubmissionStatus,
}

/// PATCH /api/v1/admin/contact/bulk - Apply a status to several submissions
async fn bulk_update(
    State(state): State<AppState>,
    Json(body): Json<BulkUpdateRequest>,
) -> Result<Json<ApiResponse<AffectedResponse>>, ApiError> {
    let affected = state
        .contact_service
        .bulk_update_status(&body.ids, body.status)
        .await?;
    Ok(Json(ApiResponse::new(AffectedResponse { affected })))
}

/// Request body for a bulk reply
#[derive(Debug, Deserialize)]
struct BulkReplyRequest {
    ids: Vec<i64>,
    subject: String,
    body: String,
}

/// POST /api/v1/admin/contact/bulk-reply - Send the same reply to several
/// senders.
///
/// Answers 207 with one outcome per recipient; submissions whose reply went
/// out are marked responded.
async fn bulk_reply(
    State(state): State<AppState>,
    Json(body): Json<BulkReplyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.ids.is_empty() {
        return Err(ApiError::validation_error("No submission IDs provided"));
    }

    let mut recipients = Vec::with_capacity(body.ids.len());
    for id in &body.ids {
        let submission = state.contact_service.open(*id).await?;
        recipients.push((submission.email, submission.name));
    }

    let results: Vec<BulkSendResult> = state
        .email_service
        .send_bulk(&recipients, &body.subject, &body.body)
        .await?;

    // Results come back one per recipient in request order, so pairing by
    // position keeps duplicate sender addresses distinct.
    let sent_ids = responded_ids(&results, &body.ids);
    if !sent_ids.is_empty() {
        state
            .contact_service
            .bulk_update_status(&sent_ids, SubmissionStatus::Responded)
            .await?;
    }

    Ok((StatusCode::MULTI_STATUS, Json(ApiResponse::new(results))))
}

/// Submission ids whose reply actually went out, paired positionally with
/// the send results.
fn responded_ids(results: &[BulkSendResult], ids: &[i64]) -> Vec<i64> {
    results
        .iter()
        .zip(ids)
        .filter(|(result, _)| matches!(result.outcome, BulkSendOutcome::Sent))
        .map(|(_, id)| *id)
        .collect()
}

/// DELETE /api/v1/admin/contact/{id} - Delete a submission
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.contact_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(recipient: &str, outcome: BulkSendOutcome) -> BulkSendResult {
        BulkSendResult {
            recipient: recipient.to_string(),
            outcome,
        }
    }

    #[test]
    fn test_responded_ids_keeps_duplicate_senders_distinct() {
        // Two submissions from the same address; only the first send went out
        let results = vec![
            result("shared@example.com", BulkSendOutcome::Sent),
            result("shared@example.com", BulkSendOutcome::RateLimited),
            result("other@example.com", BulkSendOutcome::Sent),
        ];
        assert_eq!(responded_ids(&results, &[10, 11, 12]), vec![10, 12]);
    }

    #[test]
    fn test_responded_ids_empty_when_nothing_sent() {
        let results = vec![result(
            "a@example.com",
            BulkSendOutcome::Failed("relay down".to_string()),
        )];
        assert!(responded_ids(&results, &[1]).is_empty());
    }
}
