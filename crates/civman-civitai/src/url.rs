//! URL construction helpers for the Civitai API.

use civman_core::SearchOptions;
use url::Url;

use crate::models::ImageFilter;

/// Append `segments` to the path of `base`.
fn with_path(base: &Url, segments: &str) -> Url {
    let mut url = base.clone();
    let base_path = url.path().trim_end_matches('/');
    url.set_path(&format!("{base_path}/{segments}"));
    url
}

/// `GET /models/{id}`
pub fn build_model_url(base: &Url, model_id: u64) -> Url {
    with_path(base, &format!("models/{model_id}"))
}

/// `GET /model-versions/{id}`
pub fn build_version_url(base: &Url, version_id: u64) -> Url {
    with_path(base, &format!("model-versions/{version_id}"))
}

/// Parameters of one image listing page.
#[derive(Debug, Clone)]
pub struct ImagesQuery<'a> {
    pub model_id: u64,
    pub version_id: Option<u64>,
    pub limit: u32,
    pub filter: ImageFilter,
    pub cursor: Option<&'a str>,
}

/// `GET /images?modelId&limit&nsfw[&modelVersionId][&cursor]`
pub fn build_images_url(base: &Url, query: &ImagesQuery<'_>) -> Url {
    let mut url = with_path(base, "images");
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("modelId", &query.model_id.to_string())
            .append_pair("limit", &query.limit.to_string())
            .append_pair("nsfw", query.filter.as_param());
        if let Some(version_id) = query.version_id {
            pairs.append_pair("modelVersionId", &version_id.to_string());
        }
        if let Some(cursor) = query.cursor {
            pairs.append_pair("cursor", cursor);
        }
    }
    url
}

/// `GET /models?query&limit[&tags..][&types..][&baseModels..][&nsfw]`
pub fn build_search_url(base: &Url, options: &SearchOptions) -> Url {
    let mut url = with_path(base, "models");
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("query", options.query.trim())
            .append_pair("limit", &options.limit.clamp(1, 100).to_string());
        for tag in &options.tags {
            pairs.append_pair("tags", tag);
        }
        for category in &options.types {
            pairs.append_pair("types", category.as_str());
        }
        for base_model in &options.base_models {
            pairs.append_pair("baseModels", base_model);
        }
        if let Some(nsfw) = options.nsfw {
            pairs.append_pair("nsfw", if nsfw { "true" } else { "false" });
        }
    }
    url
}
