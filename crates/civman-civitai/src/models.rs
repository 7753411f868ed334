//! Internal API response shapes.
//!
//! These types are internal to `civman-civitai`. Consumers see the core
//! `AssetRecord`, `ImageRecord` and `ModelSummary` types instead.

use civman_core::{ImageRecord, ModelCategory};
use serde_json::{Map, Value};

/// Which half of the gallery an image listing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// `nsfw=true`
    Unsafe,
    /// `nsfw=false`
    Safe,
}

impl ImageFilter {
    /// Value of the `nsfw` query parameter.
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Unsafe => "true",
            Self::Safe => "false",
        }
    }
}

/// Fields read from `GET /models/{id}`.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    pub name: String,
    pub description: String,
    pub category: ModelCategory,
    pub nsfw: bool,
    pub creator: String,
    pub stats: Map<String, Value>,
    /// Version ids in platform order (latest first).
    pub version_ids: Vec<u64>,
}

/// Fields read from `GET /model-versions/{id}`.
#[derive(Debug, Clone)]
pub struct VersionMetadata {
    pub download_url: String,
    pub trained_words: Vec<String>,
    pub base_model: String,
    pub name: String,
}

/// One page of `GET /images`.
#[derive(Debug, Clone, Default)]
pub struct ImagesPage {
    pub items: Vec<ImageRecord>,
    /// Entries in the raw `items` array, unusable ones included.
    pub raw_count: usize,
    pub next_cursor: Option<String>,
}
