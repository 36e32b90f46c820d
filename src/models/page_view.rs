//! Page view model
//!
//! Raw view rows are de-duplicated per path, per visitor IP, per calendar
//! day by a unique constraint; analytics aggregate over the surviving rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A de-duplicated page view row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    /// Unique identifier
    pub id: i64,
    /// Request path (e.g. "/blog/hello-world")
    pub path: String,
    /// Visitor IP address
    pub visitor_ip: String,
    /// Calendar day of the view (UTC)
    pub viewed_on: NaiveDate,
    /// Insertion timestamp
    pub created_at: DateTime<Utc>,
}

/// Aggregation granularity for analytics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsBucket {
    /// One point per calendar day
    Day,
    /// One point per ISO week
    Week,
    /// One point per calendar month
    Month,
}

impl Default for AnalyticsBucket {
    fn default() -> Self {
        Self::Day
    }
}

impl AnalyticsBucket {
    /// Convert bucket to query-string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsBucket::Day => "day",
            AnalyticsBucket::Week => "week",
            AnalyticsBucket::Month => "month",
        }
    }

    /// SQLite strftime format that maps a date to its bucket label
    pub fn strftime_format(&self) -> &'static str {
        match self {
            AnalyticsBucket::Day => "%Y-%m-%d",
            AnalyticsBucket::Week => "%Y-W%W",
            AnalyticsBucket::Month => "%Y-%m",
        }
    }
}

/// One point in a bucketed view series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewBucket {
    /// Bucket label ("2026-08-01", "2026-W31", "2026-08")
    pub bucket: String,
    /// Unique views in the bucket
    pub views: i64,
}

/// A path with its total view count, for the top-pages report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathViewCount {
    /// Request path
    pub path: String,
    /// Unique views over the requested range
    pub views: i64,
}

/// Summary figures for the analytics dashboard header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSummary {
    /// Unique views over the requested range
    pub total_views: i64,
    /// Distinct visitor IPs over the requested range
    pub unique_visitors: i64,
    /// Distinct paths viewed over the requested range
    pub paths_viewed: i64,
}
