//! Public configuration for the Civitai client.

use std::time::Duration;

use civman_core::Settings;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://civitai.com/api/v1";

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "CivitaiModelManager/2.0";

/// Configuration for the Civitai client.
///
/// # Example
///
/// ```
/// use civman_civitai::CivitaiClientConfig;
/// use std::time::Duration;
///
/// let config = CivitaiClientConfig::new()
///     .with_rate_limit_delay(Duration::from_secs(1))
///     .with_fetch_batch_size(50);
/// ```
#[derive(Debug, Clone)]
pub struct CivitaiClientConfig {
    /// API root, e.g. `https://civitai.com/api/v1`
    pub(crate) base_url: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Timeout for JSON requests (file transfers are not bounded)
    pub(crate) timeout: Duration,
    /// Optional bearer token
    pub(crate) api_key: Option<String>,
    /// Minimum spacing between two requests
    pub(crate) rate_limit_delay: Duration,
    /// Page size for image listings
    pub(crate) fetch_batch_size: u32,
}

impl Default for CivitaiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            api_key: None,
            rate_limit_delay: Duration::from_millis(500),
            fetch_batch_size: 100,
        }
    }
}

impl CivitaiClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a configuration from application settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .with_optional_api_key(settings.effective_api_key().map(str::to_string))
            .with_rate_limit_delay(settings.effective_rate_limit_delay())
            .with_fetch_batch_size(settings.effective_fetch_batch_size())
    }

    /// Set the API root.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the timeout for JSON requests.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the API key sent as a bearer token.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set an optional API key. Blank keys mean anonymous access.
    #[must_use]
    pub fn with_optional_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Set the minimum spacing between requests.
    ///
    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// Set the page size for image listings (clamped to 1..=200).
    #[must_use]
    pub fn with_fetch_batch_size(mut self, size: u32) -> Self {
        self.fetch_batch_size = size.clamp(1, 200);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CivitaiClientConfig::new();
        assert_eq!(config.base_url, "https://civitai.com/api/v1");
        assert_eq!(config.user_agent, "CivitaiModelManager/2.0");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.api_key.is_none());
        assert_eq!(config.fetch_batch_size, 100);
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            api_key: Some("secret".to_string()),
            rate_limit_delay: Some(1.5),
            fetch_batch_size: Some(500),
            ..Default::default()
        };
        let config = CivitaiClientConfig::from_settings(&settings);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.rate_limit_delay, Duration::from_millis(1500));
        assert_eq!(config.fetch_batch_size, 200);
    }

    #[test]
    fn test_blank_key_is_anonymous() {
        let config = CivitaiClientConfig::new().with_optional_api_key(Some("  ".to_string()));
        assert!(config.api_key.is_none());
    }
}
