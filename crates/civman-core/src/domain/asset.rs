//! Asset and image records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::category::ModelCategory;

/// Base-model label used when the platform omits one.
pub const UNKNOWN_BASE_MODEL: &str = "unknown";

/// Creator name used when the platform omits one.
pub const UNKNOWN_CREATOR: &str = "Unknown";

/// Public page for a model on the platform.
const MODEL_PAGE_BASE: &str = "https://civitai.com/models";

/// One downloaded model and its provenance.
///
/// Every field except `id` has a per-field default so that catalog files
/// written by older or newer versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    #[serde(default)]
    pub id: u64,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub category: ModelCategory,
    #[serde(default = "default_base_model")]
    pub base_model: String,
    #[serde(default)]
    pub version_id: u64,
    #[serde(default)]
    pub download_url: String,
    /// Trained words, in platform order.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub nsfw: bool,
    /// Bytes on disk; 0 until downloaded.
    #[serde(default)]
    pub size: u64,
    /// `%Y-%m-%d %H:%M:%S`; empty until downloaded.
    #[serde(default)]
    pub download_date: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub favorite: bool,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default = "default_creator")]
    pub creator: String,
    #[serde(default)]
    pub version_name: String,
    #[serde(default)]
    pub stats: Map<String, Value>,
}

fn default_name() -> String {
    "Unknown".to_string()
}

fn default_base_model() -> String {
    UNKNOWN_BASE_MODEL.to_string()
}

fn default_creator() -> String {
    UNKNOWN_CREATOR.to_string()
}

impl AssetRecord {
    /// Create a record with only an id and defaults everywhere else.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: format!("model_{id}"),
            description: String::new(),
            category: ModelCategory::Other,
            base_model: default_base_model(),
            version_id: 0,
            download_url: String::new(),
            tags: Vec::new(),
            images: Vec::new(),
            nsfw: false,
            size: 0,
            download_date: String::new(),
            thumbnail: String::new(),
            favorite: false,
            last_updated: String::new(),
            creator: default_creator(),
            version_name: String::new(),
            stats: Map::new(),
        }
    }

    /// Public page URL derived from the id.
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("{MODEL_PAGE_BASE}/{}", self.id)
    }

    /// Whether the size/date pair has already been recorded.
    #[must_use]
    pub fn is_downloaded(&self) -> bool {
        !self.download_date.is_empty()
    }

    /// Record the outcome of a successful download.
    ///
    /// Returns `false` (and leaves the record untouched) if the record was
    /// already marked downloaded.
    pub fn mark_downloaded(&mut self, size: u64, timestamp: impl Into<String>) -> bool {
        if self.is_downloaded() {
            return false;
        }
        self.size = size;
        self.download_date = timestamp.into();
        true
    }

    /// Serialize to the persisted document shape, including the derived `url`.
    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(ref mut map) = value {
            map.insert("url".to_string(), Value::String(self.page_url()));
        }
        Ok(value)
    }
}

/// One gallery image belonging to a model version.
///
/// Platform fields this crate does not interpret (dimensions, prompts,
/// hashes) are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    /// Local file path once downloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub nsfw: bool,
    #[serde(default)]
    pub stats: ImageStats,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageRecord {
    /// Minimal image record, mostly useful for tests and fakes.
    #[must_use]
    pub fn new(id: u64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            local_path: None,
            nsfw: false,
            stats: ImageStats::default(),
            extra: Map::new(),
        }
    }

    /// Popularity score used for ranking.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.stats.score()
    }
}

/// Engagement counters of an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub heart_count: u64,
    #[serde(default)]
    pub laugh_count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageStats {
    /// Likes + hearts + laughs.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.like_count
            .saturating_add(self.heart_count)
            .saturating_add(self.laugh_count)
    }
}

/// Accept booleans, `null`, numbers and the platform's string levels.
///
/// Image `nsfw` values show up as `true`/`false` on some endpoints and as a
/// level name (`"None"`, `"Soft"`, `"Mature"`, `"X"`) on others.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !(s.is_empty()
                || s.eq_ignore_ascii_case("none")
                || s.eq_ignore_ascii_case("false")
                || s == "0")
        }
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_use_defaults() {
        let record: AssetRecord = serde_json::from_value(json!({ "id": 7 })).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.name, "Unknown");
        assert_eq!(record.category, ModelCategory::Other);
        assert_eq!(record.base_model, "unknown");
        assert_eq!(record.creator, "Unknown");
        assert!(!record.favorite);
        assert_eq!(record.size, 0);
        assert!(record.images.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let record: AssetRecord = serde_json::from_value(json!({
            "id": 1,
            "name": "Foo",
            "url": "https://civitai.com/models/1",
            "some_future_field": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(record.name, "Foo");
    }

    #[test]
    fn test_document_contains_derived_url() {
        let record = AssetRecord::new(100);
        let doc = record.to_document().unwrap();
        assert_eq!(doc["url"], "https://civitai.com/models/100");
        assert_eq!(doc["type"], "Other");
        assert_eq!(doc["name"], "model_100");
    }

    #[test]
    fn test_mark_downloaded_only_once() {
        let mut record = AssetRecord::new(1);
        assert!(record.mark_downloaded(1024, "2024-01-01 10:00:00"));
        assert!(!record.mark_downloaded(2048, "2025-01-01 10:00:00"));
        assert_eq!(record.size, 1024);
        assert_eq!(record.download_date, "2024-01-01 10:00:00");
    }

    #[test]
    fn test_image_score_treats_missing_counts_as_zero() {
        let image: ImageRecord = serde_json::from_value(json!({
            "id": 42,
            "url": "https://image.civitai.com/x.jpeg",
            "stats": { "likeCount": 3, "laughCount": 2, "cryCount": 9 }
        }))
        .unwrap();
        assert_eq!(image.score(), 5);
        assert_eq!(image.stats.extra["cryCount"], 9);
    }

    #[test]
    fn test_image_nsfw_level_strings() {
        let soft: ImageRecord =
            serde_json::from_value(json!({ "id": 1, "nsfw": "Soft" })).unwrap();
        assert!(soft.nsfw);

        let none: ImageRecord =
            serde_json::from_value(json!({ "id": 2, "nsfw": "None" })).unwrap();
        assert!(!none.nsfw);
    }

    #[test]
    fn test_image_extra_fields_survive() {
        let image: ImageRecord = serde_json::from_value(json!({
            "id": 5,
            "width": 512,
            "meta": { "prompt": "a cat" }
        }))
        .unwrap();
        let back = serde_json::to_value(&image).unwrap();
        assert_eq!(back["width"], 512);
        assert_eq!(back["meta"]["prompt"], "a cat");
        assert!(back.get("local_path").is_none());
    }
}
