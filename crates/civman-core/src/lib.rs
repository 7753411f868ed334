#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod download;
pub mod paths;
pub mod ports;
pub mod settings;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ConfigStore};
pub use domain::{AssetRecord, ImageRecord, ImageStats, ModelCategory, StorageGroup};
pub use download::{
    DownloadError, DownloadResult, DownloadStatus, DownloadTask, QueueEvent, TaskStage,
};
pub use ports::{
    AssetRegistrarPort, CivitaiClientPort, CivitaiPortError, CivitaiPortResult, FileFetch,
    ModelSummary, NoopQueueEmitter, ProgressFn, QueueEventEmitterPort, RegistrarError,
    ResolvedUrl, SearchOptions,
};
pub use settings::{
    DEFAULT_DOWNLOAD_COOLDOWN_SECS, DEFAULT_FETCH_BATCH_SIZE, DEFAULT_LOG_LEVEL,
    DEFAULT_RATE_LIMIT_DELAY_SECS, DEFAULT_TOP_IMAGE_COUNT, Settings, SettingsError,
    validate_settings,
};

// Re-export path utilities
pub use paths::{
    CATALOG_FILE_NAME, CONFIG_FILE_NAME, IMAGES_DIR_NAME, METADATA_FILE_NAME, PathError,
    base_model_dir_name, catalog_path, config_path, data_root, ensure_directory, model_folder,
    sanitize_name,
};
pub use utils::{TIMESTAMP_FORMAT, extract_model_urls, format_size, strip_html, timestamp_now};

#[cfg(test)]
use tempfile as _;
