//! Email service
//!
//! Outbound mail over SMTP: contact-form notifications to the site owner
//! and replies to people who submitted the form. Bodies come from tera
//! templates, sends are retried with exponential backoff, and a
//! per-recipient rate limiter keeps bulk replies from flooding an inbox.
//!
//! An empty SMTP host disables the whole service; every send then fails
//! with `EmailServiceError::Disabled`.

use crate::config::EmailConfig;
use crate::models::ContactSubmission;
use crate::services::rate_limiter::EmailRateLimiter;
use anyhow::{anyhow, Context as AnyhowContext, Result};
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Serialize;
use std::time::Duration;
use tera::{Context, Tera};
use thiserror::Error;
use tracing::{debug, warn};

/// Send attempts before giving up
const MAX_SEND_ATTEMPTS: u32 = 3;

/// Base delay between attempts; doubles after each failure
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

const NOTIFICATION_TEMPLATE: &str = "contact_notification";
const REPLY_TEMPLATE: &str = "contact_reply";

const NOTIFICATION_BODY: &str = "\
New contact form submission from {{ name }}.

Email: {{ email }}
{% if company %}Company: {{ company }}
{% endif %}{% if phone %}Phone: {{ phone }}
{% endif %}
Message:
{{ message }}
";

const REPLY_BODY: &str = "\
Hi {{ name }},

{{ body }}

--
{{ from_name }}
";

/// Email service errors
#[derive(Debug, Error)]
pub enum EmailServiceError {
    #[error("Email sending is not configured")]
    Disabled,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Outcome of one recipient in a bulk send
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum BulkSendOutcome {
    /// Delivered to the SMTP relay
    Sent,
    /// Skipped: recipient over the per-minute cap
    RateLimited,
    /// Send failed after retries
    Failed(String),
}

/// Per-recipient result of a bulk send
#[derive(Debug, Clone, Serialize)]
pub struct BulkSendResult {
    /// Recipient address
    pub recipient: String,
    /// What happened
    #[serde(flatten)]
    pub outcome: BulkSendOutcome,
}

/// Email service
pub struct EmailService {
    config: EmailConfig,
    templates: Tera,
    rate_limiter: EmailRateLimiter,
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailService {
    /// Create a new email service from SMTP configuration
    pub fn new(config: EmailConfig) -> Result<Self> {
        let mut templates = Tera::default();
        templates
            .add_raw_template(NOTIFICATION_TEMPLATE, NOTIFICATION_BODY)
            .context("Failed to compile notification template")?;
        templates
            .add_raw_template(REPLY_TEMPLATE, REPLY_BODY)
            .context("Failed to compile reply template")?;

        let mailer = if config.is_enabled() {
            let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .context("Failed to create SMTP transport")?
                .credentials(Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.clone(),
                ))
                .port(config.smtp_port)
                .build();
            Some(transport)
        } else {
            None
        };

        let rate_limiter = EmailRateLimiter::new(config.sends_per_minute as usize);

        Ok(Self {
            config,
            templates,
            rate_limiter,
            mailer,
        })
    }

    /// Whether sending is configured
    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Notify the site owner about a new contact submission
    pub async fn notify_contact(
        &self,
        submission: &ContactSubmission,
    ) -> Result<(), EmailServiceError> {
        let mut context = Context::new();
        context.insert("name", &submission.name);
        context.insert("email", &submission.email);
        context.insert("company", &submission.company);
        context.insert("phone", &submission.phone);
        context.insert("message", &submission.message);

        let body = self
            .templates
            .render(NOTIFICATION_TEMPLATE, &context)
            .context("Failed to render notification template")?;
        let subject = format!("New contact submission from {}", submission.name);

        self.send(&self.config.notify_to, &subject, &body).await
    }

    /// Send a reply to a contact submission
    pub async fn send_reply(
        &self,
        recipient: &str,
        recipient_name: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailServiceError> {
        if !self.rate_limiter.try_acquire(recipient).await {
            return Err(EmailServiceError::RateLimited(recipient.to_string()));
        }

        let rendered = self.render_reply(recipient_name, body)?;
        self.send(recipient, subject, &rendered).await
    }

    /// Send the same reply to several recipients, one result per recipient.
    ///
    /// Never fails as a whole; callers inspect the outcomes to build a
    /// partial-success response.
    pub async fn send_bulk(
        &self,
        recipients: &[(String, String)],
        subject: &str,
        body: &str,
    ) -> Result<Vec<BulkSendResult>, EmailServiceError> {
        if !self.is_enabled() {
            return Err(EmailServiceError::Disabled);
        }

        let mut results = Vec::with_capacity(recipients.len());
        for (recipient, name) in recipients {
            let outcome = match self.send_reply(recipient, name, subject, body).await {
                Ok(()) => BulkSendOutcome::Sent,
                Err(EmailServiceError::RateLimited(_)) => BulkSendOutcome::RateLimited,
                Err(e) => BulkSendOutcome::Failed(e.to_string()),
            };
            results.push(BulkSendResult {
                recipient: recipient.clone(),
                outcome,
            });
        }
        Ok(results)
    }

    fn render_reply(&self, recipient_name: &str, body: &str) -> Result<String, EmailServiceError> {
        let mut context = Context::new();
        context.insert("name", recipient_name);
        context.insert("body", body);
        context.insert("from_name", &self.config.from_name);

        Ok(self
            .templates
            .render(REPLY_TEMPLATE, &context)
            .context("Failed to render reply template")?)
    }

    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailServiceError> {
        let mailer = self.mailer.as_ref().ok_or(EmailServiceError::Disabled)?;

        let from = format!("{} <{}>", self.config.from_name, self.config.from_address);
        let message = Message::builder()
            .from(
                from.parse()
                    .map_err(|_| EmailServiceError::InvalidAddress(from.clone()))?,
            )
            .to(recipient
                .parse()
                .map_err(|_| EmailServiceError::InvalidAddress(recipient.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        let mut delay = RETRY_BASE_DELAY;
        let mut last_error = None;

        for attempt in 1..=MAX_SEND_ATTEMPTS {
            match mailer.send(message.clone()).await {
                Ok(_) => {
                    debug!(attempt, "Email sent");
                    return Ok(());
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Email send attempt failed");
                    last_error = Some(e);
                    if attempt < MAX_SEND_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(EmailServiceError::InternalError(anyhow!(
            "Failed to send email after {} attempts: {}",
            MAX_SEND_ATTEMPTS,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionStatus;
    use chrono::Utc;

    fn disabled_config() -> EmailConfig {
        EmailConfig {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "hello@studio.example".to_string(),
            from_name: "Brightfold Studio".to_string(),
            notify_to: "owner@studio.example".to_string(),
            sends_per_minute: 2,
        }
    }

    fn submission() -> ContactSubmission {
        let now = Utc::now();
        ContactSubmission {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            company: Some("Analytical Engines".to_string()),
            phone: None,
            message: "We need a new site.".to_string(),
            status: SubmissionStatus::New,
            admin_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_disabled_service_rejects_sends() {
        let service = EmailService::new(disabled_config()).unwrap();
        assert!(!service.is_enabled());

        let result = service.notify_contact(&submission()).await;
        assert!(matches!(result, Err(EmailServiceError::Disabled)));

        let result = service.send_bulk(&[], "Subject", "Body").await;
        assert!(matches!(result, Err(EmailServiceError::Disabled)));
    }

    #[test]
    fn test_notification_template_renders() {
        let service = EmailService::new(disabled_config()).unwrap();
        let sub = submission();

        let mut context = Context::new();
        context.insert("name", &sub.name);
        context.insert("email", &sub.email);
        context.insert("company", &sub.company);
        context.insert("phone", &sub.phone);
        context.insert("message", &sub.message);

        let body = service
            .templates
            .render(NOTIFICATION_TEMPLATE, &context)
            .unwrap();
        assert!(body.contains("Ada"));
        assert!(body.contains("ada@example.com"));
        assert!(body.contains("Company: Analytical Engines"));
        // Absent phone leaves no dangling label
        assert!(!body.contains("Phone:"));
        assert!(body.contains("We need a new site."));
    }

    #[test]
    fn test_reply_template_renders() {
        let service = EmailService::new(disabled_config()).unwrap();
        let body = service
            .render_reply("Ada", "Thanks for reaching out, we will be in touch.")
            .unwrap();

        assert!(body.starts_with("Hi Ada,"));
        assert!(body.contains("Thanks for reaching out"));
        assert!(body.contains("Brightfold Studio"));
    }

    #[tokio::test]
    async fn test_reply_rate_limited_before_send() {
        let service = EmailService::new(disabled_config()).unwrap();

        // Sends fail with Disabled, but each attempt still consumes a
        // rate-limit slot; the third hits the cap first.
        for _ in 0..2 {
            let result = service
                .send_reply("ada@example.com", "Ada", "Re", "Body")
                .await;
            assert!(matches!(result, Err(EmailServiceError::Disabled)));
        }

        let result = service
            .send_reply("ada@example.com", "Ada", "Re", "Body")
            .await;
        assert!(matches!(result, Err(EmailServiceError::RateLimited(_))));
    }
}
