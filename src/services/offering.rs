//! Offering service
//!
//! Business logic for service offerings: validation, slug management,
//! markdown rendering of the long description, and wholesale replacement of
//! the structured sub-lists (features, benefits, pricing tiers, FAQs).

use crate::cache::MemoryCache;
use crate::db::repositories::{OfferingPatch, OfferingRepository, OfferingSubContent};
use crate::models::{
    CreateOfferingInput, Offering, OfferingDetail, OfferingStatus, UpdateOfferingInput,
};
use crate::services::markdown::MarkdownRenderer;
use crate::services::slug::{generate_slug, unique_slug};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Cache key prefix for all offering entries
const CACHE_PREFIX: &str = "offerings:";

/// Maximum title length
const MAX_TITLE_LENGTH: usize = 200;

/// Offering service errors
#[derive(Debug, Error)]
pub enum OfferingServiceError {
    #[error("Offering not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Offering service
pub struct OfferingService {
    offerings: Arc<dyn OfferingRepository>,
    cache: Arc<MemoryCache>,
    markdown: MarkdownRenderer,
}

impl OfferingService {
    /// Create a new offering service
    pub fn new(offerings: Arc<dyn OfferingRepository>, cache: Arc<MemoryCache>) -> Self {
        Self {
            offerings,
            cache,
            markdown: MarkdownRenderer::new(),
        }
    }

    /// Create a new offering with its sub-content
    pub async fn create(
        &self,
        input: CreateOfferingInput,
    ) -> Result<Offering, OfferingServiceError> {
        self.validate_title(&input.title)?;
        self.validate_sub_content(
            &input.features,
            &input.benefits,
            &input.pricing_tiers,
            &input.faqs,
        )?;

        let slug = match &input.slug {
            Some(slug) if !slug.trim().is_empty() => {
                let slug = slug.trim().to_string();
                if self.offerings.slug_exists(&slug, None).await? {
                    return Err(OfferingServiceError::DuplicateSlug(slug));
                }
                slug
            }
            _ => {
                let base = generate_slug(&input.title);
                let offerings = &self.offerings;
                unique_slug(&base, |candidate| async move {
                    offerings.slug_exists(&candidate, None).await
                })
                .await?
            }
        };

        let description_html = self.markdown.render(&input.description);
        let now = Utc::now();

        let offering = Offering {
            id: 0,
            slug,
            title: input.title.trim().to_string(),
            summary: input.summary,
            description: input.description,
            description_html,
            icon: input.icon,
            status: input.status.unwrap_or_default(),
            sort_order: input.sort_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        let sub = OfferingSubContent {
            features: input.features,
            benefits: input.benefits,
            pricing_tiers: input.pricing_tiers,
            faqs: input.faqs,
        };

        let created = self.offerings.create(&offering, &sub).await?;
        self.invalidate_cache().await;
        debug!(offering_id = created.id, slug = %created.slug, "Created offering");

        Ok(created)
    }

    /// Get an offering with sub-content by ID, regardless of status
    pub async fn get_detail(&self, id: i64) -> Result<OfferingDetail, OfferingServiceError> {
        self.offerings
            .get_detail_by_id(id)
            .await?
            .ok_or(OfferingServiceError::NotFound)
    }

    /// Get a published offering with sub-content by slug.
    ///
    /// Drafts are treated as absent.
    pub async fn get_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<OfferingDetail, OfferingServiceError> {
        let cache_key = format!("{}slug:{}", CACHE_PREFIX, slug);
        if let Ok(Some(cached)) = self.cache.get::<OfferingDetail>(&cache_key).await {
            return Ok(cached);
        }

        let detail = self
            .offerings
            .get_detail_by_slug(slug)
            .await?
            .filter(|d| d.offering.status == OfferingStatus::Published)
            .ok_or(OfferingServiceError::NotFound)?;

        let _ = self.cache.set(&cache_key, &detail).await;
        Ok(detail)
    }

    /// List offerings for the admin console, any status
    pub async fn list(&self) -> Result<Vec<Offering>, OfferingServiceError> {
        Ok(self.offerings.list(None).await?)
    }

    /// List published offerings in display order, cached
    pub async fn list_published(&self) -> Result<Vec<Offering>, OfferingServiceError> {
        let cache_key = format!("{}list:published", CACHE_PREFIX);
        if let Ok(Some(cached)) = self.cache.get::<Vec<Offering>>(&cache_key).await {
            return Ok(cached);
        }

        let offerings = self.offerings.list(Some(OfferingStatus::Published)).await?;
        let _ = self.cache.set(&cache_key, &offerings).await;
        Ok(offerings)
    }

    /// Update an offering.
    ///
    /// Scalar fields merge-patch; each sub-list, when present in the input,
    /// replaces the stored list wholesale. All of it lands in one
    /// transaction.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateOfferingInput,
    ) -> Result<OfferingDetail, OfferingServiceError> {
        self.offerings
            .get_by_id(id)
            .await?
            .ok_or(OfferingServiceError::NotFound)?;

        if let Some(title) = &input.title {
            self.validate_title(title)?;
        }

        if let Some(slug) = &input.slug {
            if slug.trim().is_empty() {
                return Err(OfferingServiceError::ValidationError(
                    "Slug cannot be empty".to_string(),
                ));
            }
            if self.offerings.slug_exists(slug, Some(id)).await? {
                return Err(OfferingServiceError::DuplicateSlug(slug.clone()));
            }
        }

        // All four lists travel together so a partial save can never leave
        // the page half-updated.
        let sub = match (&input.features, &input.benefits, &input.pricing_tiers, &input.faqs) {
            (None, None, None, None) => None,
            _ => {
                let current = self
                    .offerings
                    .get_detail_by_id(id)
                    .await?
                    .ok_or(OfferingServiceError::NotFound)?;

                let features = input
                    .features
                    .clone()
                    .unwrap_or_else(|| current.features.iter().map(Into::into).collect());
                let benefits = input
                    .benefits
                    .clone()
                    .unwrap_or_else(|| current.benefits.iter().map(Into::into).collect());
                let pricing_tiers = input
                    .pricing_tiers
                    .clone()
                    .unwrap_or_else(|| current.pricing_tiers.iter().map(Into::into).collect());
                let faqs = input
                    .faqs
                    .clone()
                    .unwrap_or_else(|| current.faqs.iter().map(Into::into).collect());

                self.validate_sub_content(&features, &benefits, &pricing_tiers, &faqs)?;

                Some(OfferingSubContent {
                    features,
                    benefits,
                    pricing_tiers,
                    faqs,
                })
            }
        };

        let description_html = input
            .description
            .as_deref()
            .map(|d| self.markdown.render(d));

        let patch = OfferingPatch {
            slug: input.slug,
            title: input.title.map(|t| t.trim().to_string()),
            summary: input.summary,
            description: input.description,
            description_html,
            icon: input.icon,
            status: input.status,
            sort_order: input.sort_order,
        };

        self.offerings.update(id, &patch, sub.as_ref()).await?;
        self.invalidate_cache().await;

        self.get_detail(id).await
    }

    /// Delete an offering and all its sub-content
    pub async fn delete(&self, id: i64) -> Result<(), OfferingServiceError> {
        self.offerings
            .get_by_id(id)
            .await?
            .ok_or(OfferingServiceError::NotFound)?;

        self.offerings.delete(id).await?;
        self.invalidate_cache().await;
        Ok(())
    }

    fn validate_title(&self, title: &str) -> Result<(), OfferingServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(OfferingServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(OfferingServiceError::ValidationError(format!(
                "Title cannot exceed {} characters",
                MAX_TITLE_LENGTH
            )));
        }
        Ok(())
    }

    fn validate_sub_content(
        &self,
        features: &[crate::models::FeatureInput],
        benefits: &[crate::models::FeatureInput],
        pricing_tiers: &[crate::models::PricingTierInput],
        faqs: &[crate::models::FaqInput],
    ) -> Result<(), OfferingServiceError> {
        for feature in features.iter().chain(benefits) {
            if feature.title.trim().is_empty() {
                return Err(OfferingServiceError::ValidationError(
                    "Feature and benefit titles cannot be empty".to_string(),
                ));
            }
        }
        for tier in pricing_tiers {
            if tier.name.trim().is_empty() {
                return Err(OfferingServiceError::ValidationError(
                    "Pricing tier name cannot be empty".to_string(),
                ));
            }
            if tier.price_cents < 0 {
                return Err(OfferingServiceError::ValidationError(
                    "Price cannot be negative".to_string(),
                ));
            }
        }
        for faq in faqs {
            if faq.question.trim().is_empty() || faq.answer.trim().is_empty() {
                return Err(OfferingServiceError::ValidationError(
                    "FAQ entries need both a question and an answer".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn invalidate_cache(&self) {
        self.cache.delete_prefix(CACHE_PREFIX).await;
    }
}
