//! Search-engine indexing pings
//!
//! Best-effort notification to an indexing endpoint when content is
//! published, pointing it at the site's sitemap. Failures are logged and
//! never surface to the admin request that triggered the publish.

use crate::config::IndexingConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Request timeout for the ping
const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Indexing ping service
pub struct IndexingService {
    config: IndexingConfig,
    public_url: String,
    client: reqwest::Client,
}

impl IndexingService {
    /// Create a new indexing service
    pub fn new(config: IndexingConfig, public_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(PING_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            config,
            public_url: public_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Whether pings are enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.ping_endpoint.is_empty()
    }

    /// URL of the sitemap the ping advertises
    pub fn sitemap_url(&self) -> String {
        format!("{}/sitemap.xml", self.public_url)
    }

    /// Fire a ping in the background. Returns immediately.
    pub fn notify_published(self: &Arc<Self>) {
        if !self.is_enabled() {
            debug!("Indexing pings disabled, skipping");
            return;
        }

        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = service.ping().await {
                warn!(error = %e, "Indexing ping failed");
            }
        });
    }

    async fn ping(&self) -> Result<(), reqwest::Error> {
        let url = format!(
            "{}?sitemap={}",
            self.config.ping_endpoint,
            urlencoding::encode(&self.sitemap_url())
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(%status, "Indexing ping accepted");
        } else {
            warn!(%status, "Indexing ping rejected");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_endpoint() {
        let service = IndexingService::new(
            IndexingConfig {
                enabled: true,
                ping_endpoint: String::new(),
            },
            "https://studio.example".to_string(),
        );
        assert!(!service.is_enabled());

        let service = IndexingService::new(
            IndexingConfig {
                enabled: false,
                ping_endpoint: "https://indexer.example/ping".to_string(),
            },
            "https://studio.example".to_string(),
        );
        assert!(!service.is_enabled());
    }

    #[test]
    fn test_sitemap_url_trims_trailing_slash() {
        let service = IndexingService::new(
            IndexingConfig {
                enabled: true,
                ping_endpoint: "https://indexer.example/ping".to_string(),
            },
            "https://studio.example/".to_string(),
        );
        assert_eq!(service.sitemap_url(), "https://studio.example/sitemap.xml");
    }

    #[tokio::test]
    async fn test_notify_disabled_is_noop() {
        let service = Arc::new(IndexingService::new(
            IndexingConfig {
                enabled: false,
                ping_endpoint: String::new(),
            },
            "https://studio.example".to_string(),
        ));
        // Must not panic or spawn anything that outlives the test
        service.notify_published();
    }
}
