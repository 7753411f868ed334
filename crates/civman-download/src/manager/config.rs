//! Manager configuration.

use std::path::PathBuf;
use std::time::Duration;

use civman_core::{
    DEFAULT_DOWNLOAD_COOLDOWN_SECS, DEFAULT_TOP_IMAGE_COUNT, DownloadError, DownloadResult,
    Settings,
};

use crate::progress::DEFAULT_PROGRESS_INTERVAL;

/// Runtime knobs of the download manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadManagerConfig {
    /// Root holding the category folders.
    pub destination_root: PathBuf,
    /// Gallery images kept per model.
    pub max_images: usize,
    /// Pause before the next queued task starts.
    pub cooldown: Duration,
    /// Minimum spacing between two forwarded progress updates.
    pub progress_interval: Duration,
}

impl DownloadManagerConfig {
    /// Defaults for everything except the destination.
    pub fn new(destination_root: impl Into<PathBuf>) -> Self {
        Self {
            destination_root: destination_root.into(),
            max_images: DEFAULT_TOP_IMAGE_COUNT as usize,
            cooldown: Duration::from_secs_f64(DEFAULT_DOWNLOAD_COOLDOWN_SECS),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Build from application settings.
    ///
    /// Fails when no destination folder is configured.
    pub fn from_settings(settings: &Settings) -> DownloadResult<Self> {
        let root = settings.destination_root().ok_or_else(|| {
            DownloadError::configuration(
                "Destination folder is not set. Run `civman config set comfy_path <dir>` first.",
            )
        })?;
        Ok(Self {
            max_images: settings.effective_top_image_count(),
            cooldown: settings.effective_download_cooldown(),
            ..Self::new(root)
        })
    }

    #[must_use]
    pub const fn with_max_images(mut self, max_images: usize) -> Self {
        self.max_images = max_images;
        self
    }

    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_requires_destination() {
        let err = DownloadManagerConfig::from_settings(&Settings::with_defaults()).unwrap_err();
        assert!(matches!(err, DownloadError::Configuration { .. }));
    }

    #[test]
    fn test_from_settings_reads_limits() {
        let settings = Settings {
            comfy_path: Some("/srv/comfy".to_string()),
            top_image_count: Some(3),
            download_cooldown: Some(2.0),
            ..Settings::with_defaults()
        };
        let config = DownloadManagerConfig::from_settings(&settings).unwrap();
        assert_eq!(config.destination_root, PathBuf::from("/srv/comfy"));
        assert_eq!(config.max_images, 3);
        assert_eq!(config.cooldown, Duration::from_secs(2));
        assert_eq!(config.progress_interval, DEFAULT_PROGRESS_INTERVAL);
    }
}
