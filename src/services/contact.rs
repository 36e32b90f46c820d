//! Contact service
//!
//! Handles public contact-form intake and admin-side triage. New
//! submissions trigger a best-effort notification email to the site owner;
//! replying to a submission emails the sender and marks it responded.

use crate::db::repositories::ContactRepository;
use crate::models::{
    ContactSubmission, CreateSubmissionInput, ListParams, PagedResult, SubmissionStatus,
    UpdateSubmissionInput,
};
use crate::services::email::{EmailService, EmailServiceError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum message length accepted from the public form
const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Contact service errors
#[derive(Debug, Error)]
pub enum ContactServiceError {
    #[error("Submission not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Email error: {0}")]
    EmailError(#[from] EmailServiceError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Contact service
pub struct ContactService {
    submissions: Arc<dyn ContactRepository>,
    email: Arc<EmailService>,
}

impl ContactService {
    /// Create a new contact service
    pub fn new(submissions: Arc<dyn ContactRepository>, email: Arc<EmailService>) -> Self {
        Self { submissions, email }
    }

    /// Accept a submission from the public form.
    ///
    /// The owner notification is best-effort: a mail failure is logged and
    /// never surfaces to the visitor.
    pub async fn submit(
        &self,
        input: CreateSubmissionInput,
    ) -> Result<ContactSubmission, ContactServiceError> {
        self.validate(&input)?;

        let now = chrono::Utc::now();
        let submission = ContactSubmission {
            id: 0,
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            company: input.company.filter(|c| !c.trim().is_empty()),
            phone: input.phone.filter(|p| !p.trim().is_empty()),
            message: input.message.trim().to_string(),
            status: SubmissionStatus::New,
            admin_note: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.submissions.create(&submission).await?;
        debug!(submission_id = created.id, "Stored contact submission");

        if self.email.is_enabled() {
            if let Err(e) = self.email.notify_contact(&created).await {
                warn!(submission_id = created.id, error = %e, "Contact notification failed");
            }
        }

        Ok(created)
    }

    /// Open a submission in the admin console.
    ///
    /// First open moves `New` to `Read`.
    pub async fn open(&self, id: i64) -> Result<ContactSubmission, ContactServiceError> {
        let submission = self
            .submissions
            .get_by_id(id)
            .await?
            .ok_or(ContactServiceError::NotFound)?;

        if submission.status == SubmissionStatus::New {
            self.submissions
                .update(id, Some(SubmissionStatus::Read), None)
                .await?;
            return self
                .submissions
                .get_by_id(id)
                .await?
                .ok_or(ContactServiceError::NotFound);
        }

        Ok(submission)
    }

    /// List submissions, newest first
    pub async fn list(
        &self,
        status: Option<SubmissionStatus>,
        params: ListParams,
    ) -> Result<PagedResult<ContactSubmission>, ContactServiceError> {
        Ok(self.submissions.list(status, &params).await?)
    }

    /// Number of submissions nobody has looked at yet
    pub async fn unread_count(&self) -> Result<i64, ContactServiceError> {
        Ok(self
            .submissions
            .count_by_status(SubmissionStatus::New)
            .await?)
    }

    /// Update status and/or the internal note
    pub async fn update(
        &self,
        id: i64,
        input: UpdateSubmissionInput,
    ) -> Result<ContactSubmission, ContactServiceError> {
        self.submissions
            .get_by_id(id)
            .await?
            .ok_or(ContactServiceError::NotFound)?;

        self.submissions
            .update(id, input.status, input.admin_note.as_deref())
            .await?;

        self.submissions
            .get_by_id(id)
            .await?
            .ok_or(ContactServiceError::NotFound)
    }

    /// Email a reply to the submitter and mark the submission responded.
    ///
    /// Unlike the intake notification, a mail failure here is an error:
    /// the admin needs to know the reply did not go out.
    pub async fn reply(
        &self,
        id: i64,
        subject: &str,
        body: &str,
    ) -> Result<ContactSubmission, ContactServiceError> {
        if subject.trim().is_empty() || body.trim().is_empty() {
            return Err(ContactServiceError::ValidationError(
                "Reply subject and body cannot be empty".to_string(),
            ));
        }

        let submission = self
            .submissions
            .get_by_id(id)
            .await?
            .ok_or(ContactServiceError::NotFound)?;

        self.email
            .send_reply(&submission.email, &submission.name, subject, body)
            .await?;

        self.submissions
            .update(id, Some(SubmissionStatus::Responded), None)
            .await?;

        self.submissions
            .get_by_id(id)
            .await?
            .ok_or(ContactServiceError::NotFound)
    }

    /// Apply a triage status to a set of submissions
    pub async fn bulk_update_status(
        &self,
        ids: &[i64],
        status: SubmissionStatus,
    ) -> Result<u64, ContactServiceError> {
        if ids.is_empty() {
            return Err(ContactServiceError::ValidationError(
                "No submission IDs provided".to_string(),
            ));
        }
        Ok(self.submissions.bulk_update_status(ids, status).await?)
    }

    /// Delete a submission
    pub async fn delete(&self, id: i64) -> Result<(), ContactServiceError> {
        self.submissions
            .get_by_id(id)
            .await?
            .ok_or(ContactServiceError::NotFound)?;
        Ok(self.submissions.delete(id).await?)
    }

    fn validate(&self, input: &CreateSubmissionInput) -> Result<(), ContactServiceError> {
        if input.name.trim().is_empty() {
            return Err(ContactServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }
        let email = input.email.trim();
        if email.is_empty() || !email.contains('@') || email.starts_with('@') || email.ends_with('@')
        {
            return Err(ContactServiceError::ValidationError(
                "Invalid email address".to_string(),
            ));
        }
        let message = input.message.trim();
        if message.is_empty() {
            return Err(ContactServiceError::ValidationError(
                "Message cannot be empty".to_string(),
            ));
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ContactServiceError::ValidationError(format!(
                "Message cannot exceed {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmailConfig;
    use crate::db::migrations::run_migrations;
    use crate::db::repositories::SqlxContactRepository;
    use crate::db::create_test_pool;

    async fn setup() -> ContactService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");

        let email = EmailService::new(EmailConfig {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "hello@studio.example".to_string(),
            from_name: "Studio".to_string(),
            notify_to: "owner@studio.example".to_string(),
            sends_per_minute: 5,
        })
        .expect("Failed to build email service");

        ContactService::new(SqlxContactRepository::boxed(pool), Arc::new(email))
    }

    fn valid_input() -> CreateSubmissionInput {
        CreateSubmissionInput {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            company: None,
            phone: Some("  ".to_string()),
            message: "We need a new site.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_stores_and_normalizes() {
        let service = setup().await;

        let created = service.submit(valid_input()).await.unwrap();
        assert_eq!(created.status, SubmissionStatus::New);
        // Blank optional fields are dropped
        assert_eq!(created.phone, None);
        assert_eq!(created.name, "Ada");
    }

    #[tokio::test]
    async fn test_submit_survives_disabled_email() {
        // The email service is disabled in setup(); intake must still work.
        let service = setup().await;
        assert!(service.submit(valid_input()).await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_input() {
        let service = setup().await;

        let mut input = valid_input();
        input.email = "not-an-email".to_string();
        assert!(matches!(
            service.submit(input).await,
            Err(ContactServiceError::ValidationError(_))
        ));

        let mut input = valid_input();
        input.message = "   ".to_string();
        assert!(matches!(
            service.submit(input).await,
            Err(ContactServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_open_marks_read_once() {
        let service = setup().await;
        let created = service.submit(valid_input()).await.unwrap();

        let opened = service.open(created.id).await.unwrap();
        assert_eq!(opened.status, SubmissionStatus::Read);

        // Re-opening does not bump it further
        service
            .update(
                created.id,
                UpdateSubmissionInput {
                    status: Some(SubmissionStatus::Responded),
                    admin_note: None,
                },
            )
            .await
            .unwrap();
        let opened = service.open(created.id).await.unwrap();
        assert_eq!(opened.status, SubmissionStatus::Responded);
    }

    #[tokio::test]
    async fn test_unread_count_and_bulk() {
        let service = setup().await;

        let mut ids = Vec::new();
        for i in 0..3 {
            let mut input = valid_input();
            input.email = format!("person{}@example.com", i);
            ids.push(service.submit(input).await.unwrap().id);
        }
        assert_eq!(service.unread_count().await.unwrap(), 3);

        let affected = service
            .bulk_update_status(&ids[..2], SubmissionStatus::Read)
            .await
            .unwrap();
        assert_eq!(affected, 2);
        assert_eq!(service.unread_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_note() {
        let service = setup().await;
        let created = service.submit(valid_input()).await.unwrap();

        let updated = service
            .update(
                created.id,
                UpdateSubmissionInput {
                    status: None,
                    admin_note: Some("Follow up next week".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.admin_note.as_deref(), Some("Follow up next week"));
        assert_eq!(updated.status, SubmissionStatus::New);
    }

    #[tokio::test]
    async fn test_reply_requires_email() {
        // Email disabled, so replying must fail and leave status alone.
        let service = setup().await;
        let created = service.submit(valid_input()).await.unwrap();

        let result = service
            .reply(created.id, "Re: your inquiry", "Thanks!")
            .await;
        assert!(matches!(result, Err(ContactServiceError::EmailError(_))));

        let current = service.open(created.id).await.unwrap();
        assert_ne!(current.status, SubmissionStatus::Responded);
    }

    #[tokio::test]
    async fn test_delete() {
        let service = setup().await;
        let created = service.submit(valid_input()).await.unwrap();

        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.open(created.id).await,
            Err(ContactServiceError::NotFound)
        ));
    }
}
