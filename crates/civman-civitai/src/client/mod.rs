//! Civitai client for metadata, galleries, search and file transfers.

mod files;
mod images;
mod metadata;
mod search;

use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::config::CivitaiClientConfig;
use crate::error::CivitaiResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::rate_limit::RateLimiter;

// ============================================================================
// Type Aliases
// ============================================================================

/// Default Civitai client using the reqwest HTTP backend.
pub type DefaultCivitaiClient = CivitaiClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the Civitai REST API.
///
/// Generic over the HTTP backend so tests can use a fake. All requests,
/// including file transfers, pass through one [`RateLimiter`].
pub struct CivitaiClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) config: CivitaiClientConfig,
    pub(crate) base_url: Url,
    pub(crate) limiter: RateLimiter,
}

impl DefaultCivitaiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CivitaiClientConfig) -> CivitaiResult<Self> {
        let backend = ReqwestBackend::new(&config)?;
        CivitaiClient::with_backend(config, backend)
    }
}

impl<B: HttpBackend> CivitaiClient<B> {
    /// Create a client around an arbitrary backend.
    pub(crate) fn with_backend(config: CivitaiClientConfig, backend: B) -> CivitaiResult<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let limiter = RateLimiter::new(config.rate_limit_delay);
        Ok(Self {
            backend,
            config,
            base_url,
            limiter,
        })
    }

    /// Rate-limited JSON GET.
    pub(crate) async fn get_json(&self, url: &Url) -> CivitaiResult<Value> {
        self.limiter.acquire().await;
        debug!(url = %url, "GET");
        self.backend.get_json(url).await.inspect_err(|e| {
            error!(url = %url, error = %e, "API request failed");
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::http::testing::FakeBackend;
    use serde_json::json;
    use std::time::Duration;

    /// Client over a fake backend with no rate limiting.
    pub fn fake_client(backend: FakeBackend) -> CivitaiClient<FakeBackend> {
        let config = CivitaiClientConfig::new().with_rate_limit_delay(Duration::ZERO);
        CivitaiClient::with_backend(config, backend).unwrap()
    }

    pub fn fake_model_json(id: u64, version_ids: &[u64]) -> Value {
        let versions: Vec<Value> = version_ids.iter().map(|v| json!({ "id": v })).collect();
        json!({
            "id": id,
            "name": format!("Model {id}"),
            "description": "<p>A <i>fine</i> model</p>",
            "type": "LORA",
            "nsfw": false,
            "creator": { "username": "alice" },
            "stats": { "downloadCount": 1000 },
            "modelVersions": versions
        })
    }

    pub fn fake_version_json(id: u64) -> Value {
        json!({
            "id": id,
            "name": format!("v{id}"),
            "baseModel": "SD 1.5",
            "downloadUrl": format!("https://civitai.com/api/download/models/{id}"),
            "trainedWords": ["trigger"]
        })
    }

    #[test]
    fn test_default_client_creation() {
        let _client = DefaultCivitaiClient::new(CivitaiClientConfig::new()).unwrap();
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = CivitaiClientConfig::new().with_base_url("not a url");
        assert!(CivitaiClient::with_backend(config, FakeBackend::new()).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_share_one_rate_limiter() {
        let backend = FakeBackend::new().with_json("/models/1", json!({ "id": 1 }));
        let config = CivitaiClientConfig::new().with_rate_limit_delay(Duration::from_millis(500));
        let client = CivitaiClient::with_backend(config, backend).unwrap();
        let url = Url::parse("https://civitai.com/api/v1/models/1").unwrap();

        client.get_json(&url).await.unwrap();
        client.get_json(&url).await.unwrap();

        let times = client.backend.request_times();
        assert_eq!(times.len(), 2);
        let gap = times[1] - times[0];
        assert!(gap >= Duration::from_millis(500));
        assert!(gap < Duration::from_millis(550));
    }
}
