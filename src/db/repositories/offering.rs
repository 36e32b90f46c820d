//! Offering repository
//!
//! Database operations for service offerings. The parent row and its
//! sub-lists (features, benefits, pricing tiers, FAQs) are always written
//! in one transaction; every save replaces the sub-lists wholesale.

use crate::models::{
    FaqInput, FeatureInput, Offering, OfferingBenefit, OfferingDetail, OfferingFaq,
    OfferingFeature, OfferingStatus, PricingTier, PricingTierInput,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::sync::Arc;

/// Sub-content lists written alongside an offering
#[derive(Debug, Clone, Default)]
pub struct OfferingSubContent {
    /// Feature list
    pub features: Vec<FeatureInput>,
    /// Benefit list
    pub benefits: Vec<FeatureInput>,
    /// Pricing tiers
    pub pricing_tiers: Vec<PricingTierInput>,
    /// FAQ entries
    pub faqs: Vec<FaqInput>,
}

/// Scalar fields written on update; `None` leaves the stored value alone
#[derive(Debug, Clone, Default)]
pub struct OfferingPatch {
    /// New slug
    pub slug: Option<String>,
    /// New title
    pub title: Option<String>,
    /// New summary
    pub summary: Option<String>,
    /// New markdown description
    pub description: Option<String>,
    /// New rendered description
    pub description_html: Option<String>,
    /// New icon
    pub icon: Option<String>,
    /// New status
    pub status: Option<OfferingStatus>,
    /// New display order
    pub sort_order: Option<i64>,
}

/// Offering repository trait
#[async_trait]
pub trait OfferingRepository: Send + Sync {
    /// Create an offering with its sub-content in one transaction
    async fn create(&self, offering: &Offering, sub: &OfferingSubContent) -> Result<Offering>;

    /// Get offering scalar row by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Offering>>;

    /// Get offering with all sub-content by slug
    async fn get_detail_by_slug(&self, slug: &str) -> Result<Option<OfferingDetail>>;

    /// Get offering with all sub-content by ID
    async fn get_detail_by_id(&self, id: i64) -> Result<Option<OfferingDetail>>;

    /// List offerings, optionally restricted to one status, in display order
    async fn list(&self, status: Option<OfferingStatus>) -> Result<Vec<Offering>>;

    /// Update scalar fields and optionally replace sub-lists, in one transaction
    async fn update(
        &self,
        id: i64,
        patch: &OfferingPatch,
        sub: Option<&OfferingSubContent>,
    ) -> Result<()>;

    /// Delete an offering (sub-content cascades)
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check whether a slug is already taken, optionally excluding one offering
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;
}

/// SQLx-based offering repository implementation
pub struct SqlxOfferingRepository {
    pool: SqlitePool,
}

impl SqlxOfferingRepository {
    /// Create a new SQLx offering repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn OfferingRepository> {
        Arc::new(Self::new(pool))
    }

    async fn load_detail(&self, offering: Offering) -> Result<OfferingDetail> {
        let id = offering.id;

        let features = sqlx::query(
            "SELECT id, offering_id, title, description, sort_order FROM offering_features WHERE offering_id = ? ORDER BY sort_order, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load offering features")?
        .iter()
        .map(|r| OfferingFeature {
            id: r.get("id"),
            offering_id: r.get("offering_id"),
            title: r.get("title"),
            description: r.get("description"),
            sort_order: r.get("sort_order"),
        })
        .collect();

        let benefits = sqlx::query(
            "SELECT id, offering_id, title, description, sort_order FROM offering_benefits WHERE offering_id = ? ORDER BY sort_order, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load offering benefits")?
        .iter()
        .map(|r| OfferingBenefit {
            id: r.get("id"),
            offering_id: r.get("offering_id"),
            title: r.get("title"),
            description: r.get("description"),
            sort_order: r.get("sort_order"),
        })
        .collect();

        let pricing_tiers = sqlx::query(
            "SELECT id, offering_id, name, price_cents, currency, billing_period, highlights, sort_order FROM offering_pricing_tiers WHERE offering_id = ? ORDER BY sort_order, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load pricing tiers")?
        .iter()
        .map(|r| PricingTier {
            id: r.get("id"),
            offering_id: r.get("offering_id"),
            name: r.get("name"),
            price_cents: r.get("price_cents"),
            currency: r.get("currency"),
            billing_period: r.get("billing_period"),
            highlights: r.get("highlights"),
            sort_order: r.get("sort_order"),
        })
        .collect();

        let faqs = sqlx::query(
            "SELECT id, offering_id, question, answer, sort_order FROM offering_faqs WHERE offering_id = ? ORDER BY sort_order, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load offering FAQs")?
        .iter()
        .map(|r| OfferingFaq {
            id: r.get("id"),
            offering_id: r.get("offering_id"),
            question: r.get("question"),
            answer: r.get("answer"),
            sort_order: r.get("sort_order"),
        })
        .collect();

        Ok(OfferingDetail {
            offering,
            features,
            benefits,
            pricing_tiers,
            faqs,
        })
    }
}

async fn write_sub_content(
    tx: &mut Transaction<'_, Sqlite>,
    offering_id: i64,
    sub: &OfferingSubContent,
) -> Result<()> {
    for table in [
        "offering_features",
        "offering_benefits",
        "offering_pricing_tiers",
        "offering_faqs",
    ] {
        let sql = format!("DELETE FROM {} WHERE offering_id = ?", table);
        sqlx::query(&sql)
            .bind(offering_id)
            .execute(&mut **tx)
            .await
            .with_context(|| format!("Failed to clear {}", table))?;
    }

    for (i, feature) in sub.features.iter().enumerate() {
        sqlx::query(
            "INSERT INTO offering_features (offering_id, title, description, sort_order) VALUES (?, ?, ?, ?)",
        )
        .bind(offering_id)
        .bind(&feature.title)
        .bind(&feature.description)
        .bind(i as i64)
        .execute(&mut **tx)
        .await
        .context("Failed to insert feature")?;
    }

    for (i, benefit) in sub.benefits.iter().enumerate() {
        sqlx::query(
            "INSERT INTO offering_benefits (offering_id, title, description, sort_order) VALUES (?, ?, ?, ?)",
        )
        .bind(offering_id)
        .bind(&benefit.title)
        .bind(&benefit.description)
        .bind(i as i64)
        .execute(&mut **tx)
        .await
        .context("Failed to insert benefit")?;
    }

    for (i, tier) in sub.pricing_tiers.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO offering_pricing_tiers
                (offering_id, name, price_cents, currency, billing_period, highlights, sort_order)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(offering_id)
        .bind(&tier.name)
        .bind(tier.price_cents)
        .bind(tier.currency.as_deref().unwrap_or("USD"))
        .bind(tier.billing_period.as_deref().unwrap_or("monthly"))
        .bind(&tier.highlights)
        .bind(i as i64)
        .execute(&mut **tx)
        .await
        .context("Failed to insert pricing tier")?;
    }

    for (i, faq) in sub.faqs.iter().enumerate() {
        sqlx::query(
            "INSERT INTO offering_faqs (offering_id, question, answer, sort_order) VALUES (?, ?, ?, ?)",
        )
        .bind(offering_id)
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(i as i64)
        .execute(&mut **tx)
        .await
        .context("Failed to insert FAQ")?;
    }

    Ok(())
}

#[async_trait]
impl OfferingRepository for SqlxOfferingRepository {
    async fn create(&self, offering: &Offering, sub: &OfferingSubContent) -> Result<Offering> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let result = sqlx::query(
            r#"
            INSERT INTO offerings
                (slug, title, summary, description, description_html, icon, status, sort_order, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&offering.slug)
        .bind(&offering.title)
        .bind(&offering.summary)
        .bind(&offering.description)
        .bind(&offering.description_html)
        .bind(&offering.icon)
        .bind(offering.status.as_str())
        .bind(offering.sort_order)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to create offering")?;

        let id = result.last_insert_rowid();
        write_sub_content(&mut tx, id, sub).await?;
        tx.commit().await.context("Failed to commit offering")?;

        let mut created = offering.clone();
        created.id = id;
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Offering>> {
        let row = sqlx::query(
            "SELECT id, slug, title, summary, description, description_html, icon, status, sort_order, created_at, updated_at FROM offerings WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get offering by ID")?;

        row.map(|r| row_to_offering(&r)).transpose()
    }

    async fn get_detail_by_slug(&self, slug: &str) -> Result<Option<OfferingDetail>> {
        let row = sqlx::query(
            "SELECT id, slug, title, summary, description, description_html, icon, status, sort_order, created_at, updated_at FROM offerings WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get offering by slug")?;

        match row {
            Some(row) => Ok(Some(self.load_detail(row_to_offering(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn get_detail_by_id(&self, id: i64) -> Result<Option<OfferingDetail>> {
        match self.get_by_id(id).await? {
            Some(offering) => Ok(Some(self.load_detail(offering).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, status: Option<OfferingStatus>) -> Result<Vec<Offering>> {
        let rows = sqlx::query(
            r#"
            SELECT id, slug, title, summary, description, description_html, icon, status, sort_order, created_at, updated_at
            FROM offerings
            WHERE status = COALESCE(?, status)
            ORDER BY sort_order, title
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list offerings")?;

        rows.iter().map(row_to_offering).collect()
    }

    async fn update(
        &self,
        id: i64,
        patch: &OfferingPatch,
        sub: Option<&OfferingSubContent>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            UPDATE offerings SET
                slug = COALESCE(?, slug),
                title = COALESCE(?, title),
                summary = COALESCE(?, summary),
                description = COALESCE(?, description),
                description_html = COALESCE(?, description_html),
                icon = COALESCE(?, icon),
                status = COALESCE(?, status),
                sort_order = COALESCE(?, sort_order),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.slug)
        .bind(&patch.title)
        .bind(&patch.summary)
        .bind(&patch.description)
        .bind(&patch.description_html)
        .bind(&patch.icon)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.sort_order)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to update offering")?;

        if let Some(sub) = sub {
            write_sub_content(&mut tx, id, sub).await?;
        }

        tx.commit().await.context("Failed to commit offering update")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM offerings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete offering")?;
        Ok(())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM offerings WHERE slug = ? AND id != COALESCE(?, -1)",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check offering slug")?;
        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

fn row_to_offering(row: &sqlx::sqlite::SqliteRow) -> Result<Offering> {
    let status_str: String = row.get("status");
    let status = OfferingStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid offering status: {}", status_str))?;

    Ok(Offering {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        summary: row.get("summary"),
        description: row.get("description"),
        description_html: row.get("description_html"),
        icon: row.get("icon"),
        status,
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxOfferingRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxOfferingRepository::new(pool)
    }

    fn test_offering(slug: &str) -> Offering {
        let now = Utc::now();
        Offering {
            id: 0,
            slug: slug.to_string(),
            title: format!("Title {}", slug),
            summary: None,
            description: "desc".to_string(),
            description_html: "<p>desc</p>".to_string(),
            icon: None,
            status: OfferingStatus::Draft,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn sub_content() -> OfferingSubContent {
        OfferingSubContent {
            features: vec![
                FeatureInput {
                    title: "Responsive layout".to_string(),
                    description: None,
                },
                FeatureInput {
                    title: "CMS integration".to_string(),
                    description: Some("Editable without a developer".to_string()),
                },
            ],
            benefits: vec![FeatureInput {
                title: "Faster launches".to_string(),
                description: None,
            }],
            pricing_tiers: vec![PricingTierInput {
                name: "Starter".to_string(),
                price_cents: 150000,
                currency: None,
                billing_period: Some("one-time".to_string()),
                highlights: Some("5 pages\n2 revisions".to_string()),
            }],
            faqs: vec![FaqInput {
                question: "How long does it take?".to_string(),
                answer: "Four to six weeks.".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_create_with_sub_content() {
        let repo = setup().await;

        let created = repo
            .create(&test_offering("web-design"), &sub_content())
            .await
            .expect("Failed to create offering");

        let detail = repo
            .get_detail_by_slug("web-design")
            .await
            .expect("Failed to get detail")
            .expect("Offering not found");

        assert_eq!(detail.offering.id, created.id);
        assert_eq!(detail.features.len(), 2);
        assert_eq!(detail.features[0].title, "Responsive layout");
        assert_eq!(detail.benefits.len(), 1);
        assert_eq!(detail.pricing_tiers[0].currency, "USD");
        assert_eq!(detail.pricing_tiers[0].billing_period, "one-time");
        assert_eq!(detail.faqs.len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_sub_lists() {
        let repo = setup().await;
        let created = repo
            .create(&test_offering("web-design"), &sub_content())
            .await
            .expect("Failed to create offering");

        let replacement = OfferingSubContent {
            features: vec![FeatureInput {
                title: "Only one now".to_string(),
                description: None,
            }],
            ..Default::default()
        };
        repo.update(created.id, &OfferingPatch::default(), Some(&replacement))
            .await
            .expect("Failed to update");

        let detail = repo
            .get_detail_by_id(created.id)
            .await
            .unwrap()
            .expect("Offering not found");
        assert_eq!(detail.features.len(), 1);
        assert_eq!(detail.features[0].title, "Only one now");
        assert!(detail.pricing_tiers.is_empty());
        assert!(detail.faqs.is_empty());
    }

    #[tokio::test]
    async fn test_update_without_sub_keeps_lists() {
        let repo = setup().await;
        let created = repo
            .create(&test_offering("web-design"), &sub_content())
            .await
            .expect("Failed to create offering");

        let patch = OfferingPatch {
            title: Some("New Title".to_string()),
            ..Default::default()
        };
        repo.update(created.id, &patch, None).await.expect("Failed to update");

        let detail = repo
            .get_detail_by_id(created.id)
            .await
            .unwrap()
            .expect("Offering not found");
        assert_eq!(detail.offering.title, "New Title");
        assert_eq!(detail.features.len(), 2);
    }

    #[tokio::test]
    async fn test_list_filters_published() {
        let repo = setup().await;
        repo.create(&test_offering("draft-one"), &OfferingSubContent::default())
            .await
            .unwrap();
        let mut published = test_offering("live-one");
        published.status = OfferingStatus::Published;
        repo.create(&published, &OfferingSubContent::default()).await.unwrap();

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let live = repo.list(Some(OfferingStatus::Published)).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].slug, "live-one");
    }
}
