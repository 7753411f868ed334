//! Core-owned DTOs for Civitai operations.
//!
//! These types cross the boundary between `civman-civitai` and consumers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::ModelCategory;

/// Identifiers extracted from a model page URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedUrl {
    pub model_id: Option<u64>,
    pub version_id: Option<u64>,
}

impl ResolvedUrl {
    /// Neither id found.
    pub const UNRESOLVED: Self = Self {
        model_id: None,
        version_id: None,
    };

    /// A model id with an optional version id.
    #[must_use]
    pub const fn new(model_id: u64, version_id: Option<u64>) -> Self {
        Self {
            model_id: Some(model_id),
            version_id,
        }
    }

    /// Whether a model id was found.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.model_id.is_some()
    }
}

/// Options for searching models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Free-text query
    pub query: String,
    /// Tag filter
    pub tags: Vec<String>,
    /// Category filter
    pub types: Vec<ModelCategory>,
    /// Base model filter (e.g. "SD 1.5", "SDXL 1.0")
    pub base_models: Vec<String>,
    /// `Some(false)` hides NSFW results, `None` leaves the platform default
    pub nsfw: Option<bool>,
    /// Page size
    pub limit: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            tags: Vec::new(),
            types: Vec::new(),
            base_models: Vec::new(),
            nsfw: None,
            limit: 20,
        }
    }
}

/// Lightweight search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub id: u64,
    pub name: String,
    pub category: ModelCategory,
    pub creator: String,
    pub nsfw: bool,
    /// Platform statistics (downloads, ratings, ...)
    pub stats: Map<String, Value>,
    /// First listed version, if any
    pub latest_version_id: Option<u64>,
    pub latest_base_model: Option<String>,
}

impl ModelSummary {
    /// Download count from stats, 0 when missing.
    #[must_use]
    pub fn download_count(&self) -> u64 {
        self.stats
            .get("downloadCount")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }
}

/// Outcome of a file download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFetch {
    /// The file was transferred.
    Downloaded {
        /// Final path
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },
    /// The file existed already; nothing was transferred.
    AlreadyPresent {
        /// Existing path
        path: PathBuf,
    },
}

impl FileFetch {
    /// Path of the file on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Downloaded { path, .. } | Self::AlreadyPresent { path } => path,
        }
    }

    /// Consume into the path.
    #[must_use]
    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Downloaded { path, .. } | Self::AlreadyPresent { path } => path,
        }
    }

    /// Whether a transfer took place.
    #[must_use]
    pub const fn was_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_url() {
        assert!(!ResolvedUrl::UNRESOLVED.is_resolved());
        let resolved = ResolvedUrl::new(10, Some(20));
        assert!(resolved.is_resolved());
        assert_eq!(resolved.version_id, Some(20));
    }

    #[test]
    fn test_file_fetch_path() {
        let fetched = FileFetch::AlreadyPresent {
            path: PathBuf::from("/tmp/a.safetensors"),
        };
        assert_eq!(fetched.path(), Path::new("/tmp/a.safetensors"));
        assert!(!fetched.was_downloaded());
    }

    #[test]
    fn test_summary_download_count() {
        let mut stats = Map::new();
        stats.insert("downloadCount".to_string(), Value::from(1234));
        let summary = ModelSummary {
            id: 1,
            name: "x".to_string(),
            category: ModelCategory::Lora,
            creator: "me".to_string(),
            nsfw: false,
            stats,
            latest_version_id: None,
            latest_base_model: None,
        };
        assert_eq!(summary.download_count(), 1234);
    }
}
