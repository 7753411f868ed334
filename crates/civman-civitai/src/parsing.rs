//! Response parsing.
//!
//! Every field is read leniently: a missing or mistyped key falls back to a
//! default instead of failing the whole response.

use civman_core::domain::{UNKNOWN_BASE_MODEL, UNKNOWN_CREATOR};
use civman_core::{ImageRecord, ModelCategory, ModelSummary, strip_html};
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{ImagesPage, ModelMetadata, VersionMetadata};

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn id_field(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn object_field(value: &Value, key: &str) -> Map<String, Value> {
    value
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn category_field(value: &Value) -> ModelCategory {
    value
        .get("type")
        .and_then(|t| serde_json::from_value(t.clone()).ok())
        .unwrap_or_default()
}

/// Whether a response carries anything at all.
pub fn is_empty_response(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Parse `GET /models/{id}`.
pub fn parse_model(model_id: u64, value: &Value) -> ModelMetadata {
    let version_ids = value
        .get("modelVersions")
        .and_then(Value::as_array)
        .map(|versions| versions.iter().filter_map(|v| id_field(v, "id")).collect())
        .unwrap_or_default();

    ModelMetadata {
        name: str_field(value, "name")
            .map_or_else(|| format!("model_{model_id}"), str::to_string),
        description: strip_html(str_field(value, "description").unwrap_or_default()),
        category: category_field(value),
        nsfw: value.get("nsfw").and_then(Value::as_bool).unwrap_or(false),
        creator: value
            .get("creator")
            .and_then(|c| str_field(c, "username"))
            .unwrap_or(UNKNOWN_CREATOR)
            .to_string(),
        stats: object_field(value, "stats"),
        version_ids,
    }
}

/// Parse `GET /model-versions/{id}`.
pub fn parse_version(value: &Value) -> VersionMetadata {
    let trained_words = value
        .get("trainedWords")
        .and_then(Value::as_array)
        .map(|words| {
            words
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    VersionMetadata {
        download_url: str_field(value, "downloadUrl").unwrap_or_default().to_string(),
        trained_words,
        base_model: str_field(value, "baseModel")
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(UNKNOWN_BASE_MODEL)
            .to_string(),
        name: str_field(value, "name").unwrap_or_default().to_string(),
    }
}

/// Parse one image, skipping entries without a usable id.
pub fn parse_image(value: &Value) -> Option<ImageRecord> {
    let id = id_field(value, "id")?;
    let mut normalized = value.clone();
    if let Some(map) = normalized.as_object_mut() {
        map.insert("id".to_string(), Value::from(id));
    }
    match serde_json::from_value::<ImageRecord>(normalized) {
        Ok(image) => Some(image),
        Err(e) => {
            debug!(image_id = id, error = %e, "Skipping malformed image entry");
            None
        }
    }
}

/// Parse one page of `GET /images`.
pub fn parse_images_page(value: &Value) -> ImagesPage {
    let raw = value
        .get("items")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);
    let items = raw.iter().filter_map(parse_image).collect();

    let next_cursor = value
        .get("metadata")
        .and_then(|m| m.get("nextCursor"))
        .and_then(|c| match c {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    ImagesPage {
        items,
        raw_count: raw.len(),
        next_cursor,
    }
}

/// Parse the `items` of `GET /models` into summaries.
pub fn parse_search_items(value: &Value) -> Vec<ModelSummary> {
    value
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_summary).collect())
        .unwrap_or_default()
}

fn parse_summary(value: &Value) -> Option<ModelSummary> {
    let id = id_field(value, "id")?;
    let latest = value
        .get("modelVersions")
        .and_then(Value::as_array)
        .and_then(|v| v.first());

    Some(ModelSummary {
        id,
        name: str_field(value, "name")
            .map_or_else(|| format!("model_{id}"), str::to_string),
        category: category_field(value),
        creator: value
            .get("creator")
            .and_then(|c| str_field(c, "username"))
            .unwrap_or(UNKNOWN_CREATOR)
            .to_string(),
        nsfw: value.get("nsfw").and_then(Value::as_bool).unwrap_or(false),
        stats: object_field(value, "stats"),
        latest_version_id: latest.and_then(|v| id_field(v, "id")),
        latest_base_model: latest.and_then(|v| str_field(v, "baseModel")).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_model_defaults() {
        let model = parse_model(12, &json!({ "id": 12 }));
        assert_eq!(model.name, "model_12");
        assert_eq!(model.description, "");
        assert_eq!(model.category, ModelCategory::Other);
        assert!(!model.nsfw);
        assert_eq!(model.creator, "Unknown");
        assert!(model.version_ids.is_empty());
    }

    #[test]
    fn test_parse_model_full() {
        let model = parse_model(
            1,
            &json!({
                "name": "Detail Tweaker",
                "description": "<p>Adds <b>detail</b></p>",
                "type": "LORA",
                "nsfw": false,
                "creator": { "username": "alice" },
                "stats": { "downloadCount": 10 },
                "modelVersions": [{ "id": 300 }, { "id": 200 }]
            }),
        );
        assert_eq!(model.name, "Detail Tweaker");
        assert_eq!(model.description, "Adds detail");
        assert_eq!(model.category, ModelCategory::Lora);
        assert_eq!(model.creator, "alice");
        assert_eq!(model.stats["downloadCount"], 10);
        assert_eq!(model.version_ids, vec![300, 200]);
    }

    #[test]
    fn test_parse_version_defaults() {
        let version = parse_version(&json!({}));
        assert_eq!(version.base_model, "unknown");
        assert!(version.trained_words.is_empty());
        assert_eq!(version.download_url, "");
    }

    #[test]
    fn test_parse_version_full() {
        let version = parse_version(&json!({
            "name": "v2.0",
            "baseModel": "SDXL 1.0",
            "downloadUrl": "https://civitai.com/api/download/models/200",
            "trainedWords": ["detailed", 7, "sharp"]
        }));
        assert_eq!(version.name, "v2.0");
        assert_eq!(version.base_model, "SDXL 1.0");
        assert_eq!(version.trained_words, vec!["detailed", "sharp"]);
    }

    #[test]
    fn test_parse_images_page() {
        let page = parse_images_page(&json!({
            "items": [
                { "id": 1, "url": "https://img/1.jpeg", "nsfw": "None", "stats": { "likeCount": 2 } },
                { "url": "https://img/missing-id.jpeg" },
                { "id": "3", "url": "https://img/3.jpeg" }
            ],
            "metadata": { "nextCursor": "1|99" }
        }));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.raw_count, 3);
        assert_eq!(page.items[0].score(), 2);
        assert_eq!(page.items[1].id, 3);
        assert_eq!(page.next_cursor.as_deref(), Some("1|99"));
    }

    #[test]
    fn test_parse_images_page_without_cursor() {
        let page = parse_images_page(&json!({ "items": [] , "metadata": {} }));
        assert!(page.items.is_empty());
        assert_eq!(page.raw_count, 0);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_parse_search_items() {
        let hits = parse_search_items(&json!({
            "items": [{
                "id": 5,
                "name": "Foo",
                "type": "Checkpoint",
                "creator": { "username": "bob" },
                "stats": { "downloadCount": 99 },
                "modelVersions": [{ "id": 50, "baseModel": "SD 1.5" }]
            }]
        }));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, ModelCategory::Checkpoint);
        assert_eq!(hits[0].latest_version_id, Some(50));
        assert_eq!(hits[0].latest_base_model.as_deref(), Some("SD 1.5"));
        assert_eq!(hits[0].download_count(), 99);
    }

    #[test]
    fn test_is_empty_response() {
        assert!(is_empty_response(&json!({})));
        assert!(is_empty_response(&Value::Null));
        assert!(!is_empty_response(&json!({ "id": 1 })));
    }
}
