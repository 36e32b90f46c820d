//! Contact submission model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contact-form submission entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    /// Unique identifier
    pub id: i64,
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Optional company name
    pub company: Option<String>,
    /// Optional phone number
    pub phone: Option<String>,
    /// Message body
    pub message: String,
    /// Triage status
    pub status: SubmissionStatus,
    /// Internal note, not visible to the sender
    pub admin_note: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Submission triage status.
///
/// `New` transitions to `Read` the first time an admin opens the
/// submission; `Responded` is set when a reply is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Just arrived, nobody has looked at it
    New,
    /// Opened by an admin
    Read,
    /// A reply was sent to the submitter
    Responded,
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        Self::New
    }
}

impl SubmissionStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::New => "new",
            SubmissionStatus::Read => "read",
            SubmissionStatus::Responded => "responded",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(SubmissionStatus::New),
            "read" => Some(SubmissionStatus::Read),
            "responded" => Some(SubmissionStatus::Responded),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input from the public contact form
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubmissionInput {
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Optional company name
    pub company: Option<String>,
    /// Optional phone number
    pub phone: Option<String>,
    /// Message body
    pub message: String,
}

/// Admin-side update to a submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubmissionInput {
    /// New triage status (optional)
    pub status: Option<SubmissionStatus>,
    /// New internal note (optional)
    pub admin_note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            SubmissionStatus::New,
            SubmissionStatus::Read,
            SubmissionStatus::Responded,
        ] {
            assert_eq!(SubmissionStatus::from_str(status.as_str()), Some(status));
        }
    }
}
