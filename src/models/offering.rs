//! Service offering model
//!
//! An offering is a marketed service with structured sub-content: features,
//! benefits, pricing tiers, and FAQs. The sub-lists are stored in their own
//! tables and always saved together with the parent in one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service offering entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offering {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Offering title
    pub title: String,
    /// Short summary for card views
    pub summary: Option<String>,
    /// Long-form description (markdown)
    pub description: String,
    /// Rendered HTML description
    pub description_html: String,
    /// Icon identifier for the frontend
    pub icon: Option<String>,
    /// Publication status
    pub status: OfferingStatus,
    /// Display order on the public page
    pub sort_order: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Offering with its structured sub-content attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingDetail {
    /// The offering itself
    #[serde(flatten)]
    pub offering: Offering,
    /// Feature list, ordered by sort_order
    pub features: Vec<OfferingFeature>,
    /// Benefit list, ordered by sort_order
    pub benefits: Vec<OfferingBenefit>,
    /// Pricing tiers, ordered by sort_order
    pub pricing_tiers: Vec<PricingTier>,
    /// FAQ entries, ordered by sort_order
    pub faqs: Vec<OfferingFaq>,
}

/// Offering publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferingStatus {
    /// Draft - not visible to public
    Draft,
    /// Published - visible on the public services page
    Published,
}

impl Default for OfferingStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl OfferingStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferingStatus::Draft => "draft",
            OfferingStatus::Published => "published",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(OfferingStatus::Draft),
            "published" => Some(OfferingStatus::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for OfferingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single feature row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingFeature {
    /// Unique identifier
    pub id: i64,
    /// Parent offering ID
    #[serde(skip_serializing)]
    pub offering_id: i64,
    /// Feature title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Display order
    pub sort_order: i64,
}

/// A single benefit row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingBenefit {
    /// Unique identifier
    pub id: i64,
    /// Parent offering ID
    #[serde(skip_serializing)]
    pub offering_id: i64,
    /// Benefit title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Display order
    pub sort_order: i64,
}

/// A pricing tier row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingTier {
    /// Unique identifier
    pub id: i64,
    /// Parent offering ID
    #[serde(skip_serializing)]
    pub offering_id: i64,
    /// Tier name (e.g. "Starter")
    pub name: String,
    /// Price in minor units
    pub price_cents: i64,
    /// ISO currency code
    pub currency: String,
    /// Billing period ("monthly", "yearly", "one-time")
    pub billing_period: String,
    /// Newline-separated selling points
    pub highlights: Option<String>,
    /// Display order
    pub sort_order: i64,
}

/// An FAQ row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingFaq {
    /// Unique identifier
    pub id: i64,
    /// Parent offering ID
    #[serde(skip_serializing)]
    pub offering_id: i64,
    /// Question text
    pub question: String,
    /// Answer text
    pub answer: String,
    /// Display order
    pub sort_order: i64,
}

/// Sub-content item as supplied by the admin console.
///
/// IDs are not accepted on input; every save replaces the full sub-lists.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeatureInput {
    /// Feature or benefit title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
}

impl From<&OfferingFeature> for FeatureInput {
    fn from(row: &OfferingFeature) -> Self {
        Self {
            title: row.title.clone(),
            description: row.description.clone(),
        }
    }
}

impl From<&OfferingBenefit> for FeatureInput {
    fn from(row: &OfferingBenefit) -> Self {
        Self {
            title: row.title.clone(),
            description: row.description.clone(),
        }
    }
}

/// Pricing tier as supplied by the admin console
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingTierInput {
    /// Tier name
    pub name: String,
    /// Price in minor units
    pub price_cents: i64,
    /// ISO currency code (defaults to USD)
    pub currency: Option<String>,
    /// Billing period (defaults to monthly)
    pub billing_period: Option<String>,
    /// Newline-separated selling points
    pub highlights: Option<String>,
}

impl From<&PricingTier> for PricingTierInput {
    fn from(row: &PricingTier) -> Self {
        Self {
            name: row.name.clone(),
            price_cents: row.price_cents,
            currency: Some(row.currency.clone()),
            billing_period: Some(row.billing_period.clone()),
            highlights: row.highlights.clone(),
        }
    }
}

/// FAQ entry as supplied by the admin console
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FaqInput {
    /// Question text
    pub question: String,
    /// Answer text
    pub answer: String,
}

impl From<&OfferingFaq> for FaqInput {
    fn from(row: &OfferingFaq) -> Self {
        Self {
            question: row.question.clone(),
            answer: row.answer.clone(),
        }
    }
}

/// Input for creating a new offering
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOfferingInput {
    /// URL-friendly slug (optional, generated from title when absent)
    pub slug: Option<String>,
    /// Offering title
    pub title: String,
    /// Short summary
    pub summary: Option<String>,
    /// Long-form description (markdown)
    #[serde(default)]
    pub description: String,
    /// Icon identifier
    pub icon: Option<String>,
    /// Publication status (defaults to Draft)
    pub status: Option<OfferingStatus>,
    /// Display order
    pub sort_order: Option<i64>,
    /// Feature list
    #[serde(default)]
    pub features: Vec<FeatureInput>,
    /// Benefit list
    #[serde(default)]
    pub benefits: Vec<FeatureInput>,
    /// Pricing tiers
    #[serde(default)]
    pub pricing_tiers: Vec<PricingTierInput>,
    /// FAQ entries
    #[serde(default)]
    pub faqs: Vec<FaqInput>,
}

/// Input for updating an existing offering.
///
/// Scalar fields are merge-patched; the sub-lists, when present, replace the
/// stored lists wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOfferingInput {
    /// New slug (optional)
    pub slug: Option<String>,
    /// New title (optional)
    pub title: Option<String>,
    /// New summary (optional)
    pub summary: Option<String>,
    /// New description (optional)
    pub description: Option<String>,
    /// New icon (optional)
    pub icon: Option<String>,
    /// New status (optional)
    pub status: Option<OfferingStatus>,
    /// New display order (optional)
    pub sort_order: Option<i64>,
    /// Replacement feature list (optional)
    pub features: Option<Vec<FeatureInput>>,
    /// Replacement benefit list (optional)
    pub benefits: Option<Vec<FeatureInput>>,
    /// Replacement pricing tiers (optional)
    pub pricing_tiers: Option<Vec<PricingTierInput>>,
    /// Replacement FAQ entries (optional)
    pub faqs: Option<Vec<FaqInput>>,
}
