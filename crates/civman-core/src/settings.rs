//! Settings domain types and validation.
//!
//! Typed view over the JSON configuration document. Every field is optional
//! so missing keys fall back to the documented defaults below.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Minimum spacing between two API requests, in seconds.
pub const DEFAULT_RATE_LIMIT_DELAY_SECS: f64 = 0.5;

/// Page size for paginated image listings.
pub const DEFAULT_FETCH_BATCH_SIZE: u32 = 100;

/// Largest page size the platform accepts.
pub const MAX_FETCH_BATCH_SIZE: u32 = 200;

/// Number of gallery images kept per download.
pub const DEFAULT_TOP_IMAGE_COUNT: u32 = 9;

/// Upper bound accepted for `top_image_count`.
pub const MAX_TOP_IMAGE_COUNT: u32 = 500;

/// Pause between two queued downloads, in seconds.
pub const DEFAULT_DOWNLOAD_COOLDOWN_SECS: f64 = 0.5;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "CIVITAI_API_KEY";

const LOG_LEVELS: [&str; 5] = ["debug", "info", "warning", "warn", "error"];

/// Application settings structure.
///
/// All fields are optional to support partial documents and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Bearer token for the platform API. Empty means anonymous access.
    pub api_key: Option<String>,

    /// Minimum seconds between two outbound requests.
    pub rate_limit_delay: Option<f64>,

    /// Page size for image listings (1-200).
    pub fetch_batch_size: Option<u32>,

    /// Gallery images kept per download (0-500).
    pub top_image_count: Option<u32>,

    /// Destination root holding the category folders.
    pub comfy_path: Option<String>,

    /// Seconds to wait between two queued downloads.
    pub download_cooldown: Option<f64>,

    /// `debug`, `info`, `warning` or `error`.
    pub log_level: Option<String>,

    /// UI theme name. Not interpreted by the CLI but preserved.
    pub theme: Option<String>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_key: Some(String::new()),
            rate_limit_delay: Some(DEFAULT_RATE_LIMIT_DELAY_SECS),
            fetch_batch_size: Some(DEFAULT_FETCH_BATCH_SIZE),
            top_image_count: Some(DEFAULT_TOP_IMAGE_COUNT),
            comfy_path: None,
            download_cooldown: Some(DEFAULT_DOWNLOAD_COOLDOWN_SECS),
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
            theme: Some("dark".to_string()),
        }
    }

    /// Build settings from a raw JSON document, key by key.
    ///
    /// A key with an unusable value is treated as missing instead of
    /// invalidating the whole document.
    #[must_use]
    pub fn from_document(document: &Map<String, Value>) -> Self {
        fn field<T: serde::de::DeserializeOwned>(doc: &Map<String, Value>, key: &str) -> Option<T> {
            doc.get(key)
                .filter(|v| !v.is_null())
                .and_then(|v| serde_json::from_value(v.clone()).ok())
        }

        Self {
            api_key: field(document, "api_key"),
            rate_limit_delay: field(document, "rate_limit_delay"),
            fetch_batch_size: field(document, "fetch_batch_size"),
            top_image_count: field(document, "top_image_count"),
            comfy_path: field(document, "comfy_path"),
            download_cooldown: field(document, "download_cooldown"),
            log_level: field(document, "log_level"),
            theme: field(document, "theme"),
        }
    }

    /// Replace the API key with `CIVITAI_API_KEY` when that is set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }
    }

    /// API key, or `None` for anonymous access.
    #[must_use]
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Minimum spacing between requests.
    #[must_use]
    pub fn effective_rate_limit_delay(&self) -> Duration {
        seconds(self.rate_limit_delay, DEFAULT_RATE_LIMIT_DELAY_SECS)
    }

    /// Image page size, clamped to what the platform accepts.
    #[must_use]
    pub fn effective_fetch_batch_size(&self) -> u32 {
        self.fetch_batch_size
            .unwrap_or(DEFAULT_FETCH_BATCH_SIZE)
            .clamp(1, MAX_FETCH_BATCH_SIZE)
    }

    /// Gallery images kept per download.
    #[must_use]
    pub fn effective_top_image_count(&self) -> usize {
        self.top_image_count
            .unwrap_or(DEFAULT_TOP_IMAGE_COUNT)
            .min(MAX_TOP_IMAGE_COUNT) as usize
    }

    /// Pause between queued downloads.
    #[must_use]
    pub fn effective_download_cooldown(&self) -> Duration {
        seconds(self.download_cooldown, DEFAULT_DOWNLOAD_COOLDOWN_SECS)
    }

    /// Log level name.
    #[must_use]
    pub fn effective_log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .filter(|l| LOG_LEVELS.contains(&l.to_ascii_lowercase().as_str()))
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Destination root with `~` expanded, if configured.
    #[must_use]
    pub fn destination_root(&self) -> Option<PathBuf> {
        let raw = self.comfy_path.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if raw == "~" {
            return dirs::home_dir();
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            return dirs::home_dir().map(|home| home.join(rest));
        }
        Some(PathBuf::from(raw))
    }
}

fn seconds(value: Option<f64>, default: f64) -> Duration {
    let secs = value.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(default);
    Duration::from_secs_f64(secs)
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Rate limit delay must be between 0 and 60 seconds, got {0}")]
    InvalidRateLimitDelay(f64),

    #[error("Fetch batch size must be between 1 and {MAX_FETCH_BATCH_SIZE}, got {0}")]
    InvalidBatchSize(u32),

    #[error("Top image count must be between 0 and {MAX_TOP_IMAGE_COUNT}, got {0}")]
    InvalidImageCount(u32),

    #[error("Download cooldown must be between 0 and 60 seconds, got {0}")]
    InvalidCooldown(f64),

    #[error("Unknown log level '{0}' (expected debug, info, warning or error)")]
    InvalidLogLevel(String),

    #[error("Destination path cannot be empty")]
    EmptyDestination,
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(delay) = settings.rate_limit_delay {
        if !(0.0..=60.0).contains(&delay) {
            return Err(SettingsError::InvalidRateLimitDelay(delay));
        }
    }

    if let Some(batch) = settings.fetch_batch_size {
        if !(1..=MAX_FETCH_BATCH_SIZE).contains(&batch) {
            return Err(SettingsError::InvalidBatchSize(batch));
        }
    }

    if let Some(count) = settings.top_image_count {
        if count > MAX_TOP_IMAGE_COUNT {
            return Err(SettingsError::InvalidImageCount(count));
        }
    }

    if let Some(cooldown) = settings.download_cooldown {
        if !(0.0..=60.0).contains(&cooldown) {
            return Err(SettingsError::InvalidCooldown(cooldown));
        }
    }

    if let Some(level) = settings.log_level.as_deref() {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(SettingsError::InvalidLogLevel(level.to_string()));
        }
    }

    if settings
        .comfy_path
        .as_ref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(SettingsError::EmptyDestination);
    }

    Ok(())
}
