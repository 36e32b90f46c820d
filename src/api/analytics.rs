//! View analytics endpoints
//!
//! Public:
//! - POST /api/v1/track - Record a page view (deduplicated per day)
//!
//! Admin:
//! - GET /api/v1/admin/analytics - Dashboard report for a date range

use axum::{
    extract::{ConnectInfo, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::api::common::client_ip;
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::AnalyticsBucket;
use crate::services::AnalyticsReport;

/// Public tracking routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", post(track))
}

/// Admin analytics routes
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/", get(report))
}

/// Request body for view tracking
#[derive(Debug, Deserialize)]
struct TrackRequest {
    path: String,
}

/// Response for view tracking: whether this was a new view today
#[derive(Debug, Serialize)]
struct TrackResponse {
    counted: bool,
}

/// POST /api/v1/track - Record a page view
async fn track(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<TrackRequest>,
) -> Result<Json<ApiResponse<TrackResponse>>, ApiError> {
    let ip = client_ip(&headers, addr);
    let counted = state.analytics_service.record_view(&body.path, ip).await?;
    Ok(Json(ApiResponse::new(TrackResponse { counted })))
}

/// Query parameters for the dashboard report
#[derive(Debug, Deserialize)]
struct ReportQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    #[serde(default)]
    bucket: AnalyticsBucket,
    path: Option<String>,
    top_limit: Option<usize>,
}

/// GET /api/v1/admin/analytics - Dashboard report
async fn report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<AnalyticsReport>>, ApiError> {
    let report = state
        .analytics_service
        .report(
            query.from,
            query.to,
            query.bucket,
            query.path.as_deref(),
            query.top_limit,
        )
        .await?;
    Ok(Json(ApiResponse::new(report)))
}
