use moka::future::Cache;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::DefiLlamaSettings;
use crate::error::AppError;
use crate::models::Protocol;
use crate::utils::metrics::record_external_request;

/// Client for the public DefiLlama TVL API.
#[derive(Clone)]
pub struct DefiLlamaService {
    client: Client,
    base_url: String,
    cache: Cache<(), Arc<Vec<Protocol>>>,
}

impl DefiLlamaService {
    pub fn new(settings: &DefiLlamaSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(settings.cache_ttl_seconds))
            .build();

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Fetches the full protocol list, bypassing the cache.
    pub async fn get_protocols(&self) -> Result<Vec<Protocol>, AppError> {
        let url = format!("{}/protocols", self.base_url);
        debug!(%url, "Fetching DefiLlama protocols");

        let result = self.fetch_protocols(&url).await;
        record_external_request("defillama", result.is_ok());
        if let Err(e) = &result {
            error!("DefiLlama request failed: {}", e);
        }
        result
    }

    async fn fetch_protocols(&self, url: &str) -> Result<Vec<Protocol>, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("DefiLlama request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "DefiLlama returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<Protocol>>()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Failed to parse DefiLlama response: {}", e)))
    }

    /// Protocol list served from cache while it is fresh. Failures are not cached.
    pub async fn get_protocols_with_cache(&self) -> Result<Arc<Vec<Protocol>>, AppError> {
        self.cache
            .try_get_with((), async {
                let protocols = self.get_protocols().await?;
                info!(count = protocols.len(), "Cached DefiLlama protocols");
                Ok::<_, AppError>(Arc::new(protocols))
            })
            .await
            .map_err(|e: Arc<AppError>| (*e).clone())
    }

    pub async fn find_protocol(&self, slug: &str) -> Result<Option<Protocol>, AppError> {
        let protocols = self.get_protocols_with_cache().await?;
        Ok(protocols.iter().find(|p| p.slug == slug).cloned())
    }
}
