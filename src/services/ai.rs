//! AI content generation
//!
//! Talks to an OpenAI-compatible provider to draft blog posts and offering
//! copy, and to generate gallery images. Text generation asks the model for
//! a single JSON object and parses it into a typed draft; image generation
//! requests base64 output and stores the decoded file in the upload
//! directory.
//!
//! Requests are not retried: generation is interactive, and the admin can
//! simply click again.

use crate::config::AiConfig;
use anyhow::{anyhow, Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// AI service errors
#[derive(Debug, Error)]
pub enum AiServiceError {
    #[error("AI generation is not configured")]
    Disabled,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Could not understand the model response: {0}")]
    MalformedResponse(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// A model-drafted blog post, ready for the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPostDraft {
    /// Post title
    pub title: String,
    /// Short teaser
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Markdown body
    pub content: String,
    /// SEO title override
    #[serde(default)]
    pub seo_title: Option<String>,
    /// SEO meta description
    #[serde(default)]
    pub seo_description: Option<String>,
    /// Suggested tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A model-drafted feature or benefit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedListItem {
    /// Item title
    pub title: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
}

/// A model-drafted FAQ entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedFaq {
    /// Question text
    pub question: String,
    /// Answer text
    pub answer: String,
}

/// A model-drafted offering, ready for the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedOfferingDraft {
    /// Offering title
    pub title: String,
    /// Short summary
    #[serde(default)]
    pub summary: Option<String>,
    /// Markdown description
    pub description: String,
    /// Suggested features
    #[serde(default)]
    pub features: Vec<GeneratedListItem>,
    /// Suggested benefits
    #[serde(default)]
    pub benefits: Vec<GeneratedListItem>,
    /// Suggested FAQs
    #[serde(default)]
    pub faqs: Vec<GeneratedFaq>,
}

const POST_SYSTEM_PROMPT: &str = "\
You write blog posts for a design agency's marketing site. Respond with a \
single JSON object and nothing else, using exactly these keys: \
\"title\", \"excerpt\", \"content\" (markdown), \"seo_title\", \
\"seo_description\", \"tags\" (array of strings).";

const OFFERING_SYSTEM_PROMPT: &str = "\
You write service descriptions for a design agency's marketing site. \
Respond with a single JSON object and nothing else, using exactly these \
keys: \"title\", \"summary\", \"description\" (markdown), \"features\" and \
\"benefits\" (arrays of {\"title\", \"description\"}), \"faqs\" (array of \
{\"question\", \"answer\"}).";

/// AI service
pub struct AiService {
    config: AiConfig,
    client: reqwest::Client,
    upload_path: PathBuf,
}

impl AiService {
    /// Create a new AI service
    pub fn new(config: AiConfig, upload_path: PathBuf) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            config,
            client,
            upload_path,
        }
    }

    /// Whether generation is configured
    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Draft a blog post from a topic prompt
    pub async fn generate_post(&self, prompt: &str) -> Result<GeneratedPostDraft, AiServiceError> {
        let content = self.chat(POST_SYSTEM_PROMPT, prompt).await?;
        parse_json_payload(&content)
    }

    /// Draft an offering from a service prompt
    pub async fn generate_offering(
        &self,
        prompt: &str,
    ) -> Result<GeneratedOfferingDraft, AiServiceError> {
        let content = self.chat(OFFERING_SYSTEM_PROMPT, prompt).await?;
        parse_json_payload(&content)
    }

    /// Generate an image and store it in the upload directory.
    ///
    /// Returns the public URL of the stored file.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, AiServiceError> {
        if !self.is_enabled() {
            return Err(AiServiceError::Disabled);
        }
        validate_prompt(prompt)?;

        let body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "n": 1,
            "response_format": "b64_json",
        });

        let response = self
            .client
            .post(format!("{}/images/generations", self.api_base()))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("Image generation request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AiServiceError::ProviderError(format!(
                "{}: {}",
                status,
                truncate(&detail, 300)
            )));
        }

        let payload: ImageResponse = response
            .json()
            .await
            .context("Failed to decode image response")?;
        let b64 = payload
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| {
                AiServiceError::MalformedResponse("No image data in response".to_string())
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64.as_bytes())
            .map_err(|e| AiServiceError::MalformedResponse(format!("Invalid base64: {}", e)))?;

        let filename = format!("ai-{}.png", Uuid::new_v4());
        let file_path = self.upload_path.join(&filename);
        tokio::fs::create_dir_all(&self.upload_path)
            .await
            .context("Failed to create upload directory")?;
        tokio::fs::write(&file_path, &bytes)
            .await
            .context("Failed to write generated image")?;

        debug!(path = %file_path.display(), bytes = bytes.len(), "Stored generated image");
        Ok(format!("/uploads/{}", filename))
    }

    async fn chat(&self, system: &str, prompt: &str) -> Result<String, AiServiceError> {
        if !self.is_enabled() {
            return Err(AiServiceError::Disabled);
        }
        validate_prompt(prompt)?;

        let body = json!({
            "model": self.config.text_model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base()))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("Chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AiServiceError::ProviderError(format!(
                "{}: {}",
                status,
                truncate(&detail, 300)
            )));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .context("Failed to decode chat response")?;

        payload
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiServiceError::MalformedResponse("No choices in response".to_string()))
    }

    fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }
}

fn validate_prompt(prompt: &str) -> Result<(), AiServiceError> {
    if prompt.trim().is_empty() {
        return Err(AiServiceError::ValidationError(
            "Prompt cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Parse the JSON object the model was told to produce.
///
/// Tolerates a markdown code fence around the object, which models emit
/// even when told not to.
fn parse_json_payload<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, AiServiceError> {
    let trimmed = content.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    serde_json::from_str(inner)
        .map_err(|e| AiServiceError::MalformedResponse(format!("{}: {}", e, truncate(inner, 200))))
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}
