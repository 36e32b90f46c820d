//! Analytics service
//!
//! Records page views from the public site and answers the admin
//! dashboard's aggregate queries. Views are de-duplicated per path, per
//! visitor IP, per UTC day at the storage layer, so recording the same
//! visit twice is a no-op.

use crate::db::repositories::PageViewRepository;
use crate::models::{AnalyticsBucket, PathViewCount, ViewBucket, ViewSummary};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;

/// Default reporting window when the request does not give one
const DEFAULT_RANGE_DAYS: i64 = 30;

/// Longest accepted reporting window
const MAX_RANGE_DAYS: i64 = 366;

/// Maximum recorded path length; longer paths are almost certainly junk
const MAX_PATH_LENGTH: usize = 500;

/// Default number of rows in the top-paths report
const DEFAULT_TOP_LIMIT: usize = 10;

/// Analytics service errors
#[derive(Debug, Error)]
pub enum AnalyticsServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Full dashboard report for one date range
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    /// Range start (inclusive)
    pub from: NaiveDate,
    /// Range end (inclusive)
    pub to: NaiveDate,
    /// Aggregation granularity
    pub bucket: AnalyticsBucket,
    /// Headline figures
    pub summary: ViewSummary,
    /// Bucketed series
    pub series: Vec<ViewBucket>,
    /// Most-viewed paths
    pub top_paths: Vec<PathViewCount>,
}

/// Analytics service
pub struct AnalyticsService {
    views: Arc<dyn PageViewRepository>,
}

impl AnalyticsService {
    /// Create a new analytics service
    pub fn new(views: Arc<dyn PageViewRepository>) -> Self {
        Self { views }
    }

    /// Record a page view for today (UTC).
    ///
    /// Returns false when this visitor already viewed the path today.
    pub async fn record_view(
        &self,
        path: &str,
        visitor_ip: IpAddr,
    ) -> Result<bool, AnalyticsServiceError> {
        let path = normalize_path(path)?;
        let today = Utc::now().date_naive();

        Ok(self
            .views
            .record(&path, &visitor_ip.to_string(), today)
            .await?)
    }

    /// Build the dashboard report for a date range.
    ///
    /// Missing bounds default to the last 30 days ending today.
    pub async fn report(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        bucket: AnalyticsBucket,
        path: Option<&str>,
        top_limit: Option<usize>,
    ) -> Result<AnalyticsReport, AnalyticsServiceError> {
        let (from, to) = resolve_range(from, to)?;
        let path = match path {
            Some(p) => Some(normalize_path(p)?),
            None => None,
        };

        let summary = self.views.summary(from, to).await?;
        let series = self
            .views
            .views_over_range(from, to, bucket, path.as_deref())
            .await?;
        let top_paths = self
            .views
            .top_paths(from, to, top_limit.unwrap_or(DEFAULT_TOP_LIMIT))
            .await?;

        Ok(AnalyticsReport {
            from,
            to,
            bucket,
            summary,
            series,
            top_paths,
        })
    }
}

/// Validate and normalize a tracked path: leading slash required, query
/// strings and fragments stripped, trailing slash removed (except root).
fn normalize_path(path: &str) -> Result<String, AnalyticsServiceError> {
    let path = path.trim();
    if !path.starts_with('/') {
        return Err(AnalyticsServiceError::ValidationError(
            "Path must start with '/'".to_string(),
        ));
    }
    if path.chars().count() > MAX_PATH_LENGTH {
        return Err(AnalyticsServiceError::ValidationError(
            "Path too long".to_string(),
        ));
    }

    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    Ok(if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    })
}

fn resolve_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), AnalyticsServiceError> {
    let to = to.unwrap_or_else(|| Utc::now().date_naive());
    let from = from.unwrap_or(to - Duration::days(DEFAULT_RANGE_DAYS - 1));

    if from > to {
        return Err(AnalyticsServiceError::ValidationError(
            "Range start is after range end".to_string(),
        ));
    }
    if (to - from).num_days() >= MAX_RANGE_DAYS {
        return Err(AnalyticsServiceError::ValidationError(format!(
            "Range cannot exceed {} days",
            MAX_RANGE_DAYS
        )));
    }

    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::repositories::SqlxPageViewRepository;
    use crate::db::create_test_pool;
    use std::str::FromStr;

    async fn setup() -> AnalyticsService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");
        AnalyticsService::new(SqlxPageViewRepository::boxed(pool))
    }

    fn ip(s: &str) -> IpAddr {
        IpAddr::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_record_deduplicates_per_day() {
        let service = setup().await;

        assert!(service.record_view("/blog/hello", ip("1.2.3.4")).await.unwrap());
        assert!(!service.record_view("/blog/hello", ip("1.2.3.4")).await.unwrap());
        // Different visitor counts
        assert!(service.record_view("/blog/hello", ip("5.6.7.8")).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_strings_collapse() {
        let service = setup().await;

        assert!(service
            .record_view("/blog/hello?utm_source=x", ip("1.2.3.4"))
            .await
            .unwrap());
        assert!(!service
            .record_view("/blog/hello#section", ip("1.2.3.4"))
            .await
            .unwrap());
        assert!(!service
            .record_view("/blog/hello/", ip("1.2.3.4"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_invalid_paths_rejected() {
        let service = setup().await;

        let result = service.record_view("no-leading-slash", ip("1.2.3.4")).await;
        assert!(matches!(
            result,
            Err(AnalyticsServiceError::ValidationError(_))
        ));

        let long = format!("/{}", "x".repeat(600));
        let result = service.record_view(&long, ip("1.2.3.4")).await;
        assert!(matches!(
            result,
            Err(AnalyticsServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_report_default_range() {
        let service = setup().await;

        service.record_view("/", ip("1.2.3.4")).await.unwrap();
        service.record_view("/services", ip("1.2.3.4")).await.unwrap();
        service.record_view("/", ip("5.6.7.8")).await.unwrap();

        let report = service
            .report(None, None, AnalyticsBucket::Day, None, None)
            .await
            .unwrap();

        assert_eq!(report.summary.total_views, 3);
        assert_eq!(report.summary.unique_visitors, 2);
        assert_eq!(report.summary.paths_viewed, 2);
        assert_eq!((report.to - report.from).num_days(), 29);

        assert_eq!(report.top_paths[0].path, "/");
        assert_eq!(report.top_paths[0].views, 2);

        // All of today's views land in one day bucket
        assert_eq!(report.series.len(), 1);
        assert_eq!(report.series[0].views, 3);
    }

    #[tokio::test]
    async fn test_report_path_filter() {
        let service = setup().await;

        service.record_view("/a", ip("1.2.3.4")).await.unwrap();
        service.record_view("/b", ip("1.2.3.4")).await.unwrap();

        let report = service
            .report(None, None, AnalyticsBucket::Day, Some("/a"), None)
            .await
            .unwrap();
        assert_eq!(report.series[0].views, 1);
    }

    #[tokio::test]
    async fn test_report_invalid_range() {
        let service = setup().await;

        let from = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let result = service
            .report(Some(from), Some(to), AnalyticsBucket::Day, None, None)
            .await;
        assert!(matches!(
            result,
            Err(AnalyticsServiceError::ValidationError(_))
        ));

        let from = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let result = service
            .report(Some(from), Some(to), AnalyticsBucket::Month, None, None)
            .await;
        assert!(matches!(
            result,
            Err(AnalyticsServiceError::ValidationError(_))
        ));
    }
}
