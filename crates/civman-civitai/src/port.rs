//! Port trait implementation for `CivitaiClient`.
//!
//! Implements the core-owned `CivitaiClientPort` trait, mapping internal
//! errors to `CivitaiPortError`.

use std::path::Path;

use async_trait::async_trait;
use civman_core::{
    AssetRecord, CivitaiClientPort, CivitaiPortError, CivitaiPortResult, FileFetch, ImageRecord,
    ModelSummary, ProgressFn, ResolvedUrl, SearchOptions,
};

use crate::client::CivitaiClient;
use crate::error::CivitaiError;
use crate::http::HttpBackend;
use crate::resolver::resolve_model_url;

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `CivitaiError` to core `CivitaiPortError`.
fn map_error(err: CivitaiError) -> CivitaiPortError {
    match err {
        CivitaiError::ApiRequestFailed { status, url } => match status {
            404 => CivitaiPortError::NotFound { what: url },
            401 | 403 => CivitaiPortError::AuthRequired { what: url },
            429 => CivitaiPortError::RateLimited,
            _ => CivitaiPortError::Network {
                message: format!("API request failed with status {status}: {url}"),
                status: Some(status),
            },
        },
        CivitaiError::NotFound { what } => CivitaiPortError::NotFound { what },
        CivitaiError::InvalidResponse { message } => {
            CivitaiPortError::InvalidResponse { message }
        }
        CivitaiError::JsonParse(e) => CivitaiPortError::InvalidResponse {
            message: e.to_string(),
        },
        CivitaiError::MissingFileName { .. } | CivitaiError::InvalidUrl(_) => {
            CivitaiPortError::InvalidInput {
                message: err.to_string(),
            }
        }
        CivitaiError::Io { .. } => CivitaiPortError::Io {
            message: err.to_string(),
        },
        CivitaiError::Network(e) => CivitaiPortError::Network {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        },
        CivitaiError::Transfer { message } | CivitaiError::ClientBuild(message) => {
            CivitaiPortError::Network {
                message,
                status: None,
            }
        }
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend> CivitaiClientPort for CivitaiClient<B> {
    fn resolve_url(&self, url: &str) -> ResolvedUrl {
        resolve_model_url(url)
    }

    async fn fetch_metadata(
        &self,
        model_id: u64,
        version_id: Option<u64>,
    ) -> CivitaiPortResult<AssetRecord> {
        self.fetch_model_metadata(model_id, version_id)
            .await
            .map_err(map_error)
    }

    async fn fetch_images(
        &self,
        model_id: u64,
        version_id: Option<u64>,
        max_images: usize,
    ) -> Vec<ImageRecord> {
        self.fetch_ranked_images(model_id, version_id, max_images)
            .await
    }

    async fn search(&self, options: &SearchOptions) -> CivitaiPortResult<Vec<ModelSummary>> {
        self.search_models(options).await.map_err(map_error)
    }

    async fn download_file(
        &self,
        url: &str,
        dest_dir: &Path,
        on_progress: Option<&ProgressFn>,
    ) -> CivitaiPortResult<FileFetch> {
        self.download_to(url, dest_dir, on_progress)
            .await
            .map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{fake_client, fake_model_json, fake_version_json};
    use crate::http::testing::FakeBackend;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        let failed = |status| CivitaiError::ApiRequestFailed {
            status,
            url: "https://civitai.com/api/v1/models/1".to_string(),
        };
        assert!(matches!(
            map_error(failed(404)),
            CivitaiPortError::NotFound { .. }
        ));
        assert!(matches!(
            map_error(failed(401)),
            CivitaiPortError::AuthRequired { .. }
        ));
        assert!(matches!(
            map_error(failed(403)),
            CivitaiPortError::AuthRequired { .. }
        ));
        assert!(matches!(map_error(failed(429)), CivitaiPortError::RateLimited));
        assert_eq!(map_error(failed(502)).status(), Some(502));
    }

    #[test]
    fn test_missing_file_name_is_input_error() {
        let err = map_error(CivitaiError::MissingFileName {
            url: "https://civitai.com/".to_string(),
        });
        assert!(matches!(err, CivitaiPortError::InvalidInput { .. }));
    }

    #[test]
    fn test_resolve_url_through_port() {
        let client = fake_client(FakeBackend::new());
        let port: &dyn CivitaiClientPort = &client;
        assert_eq!(
            port.resolve_url("https://civitai.com/models/5?modelVersionId=6"),
            ResolvedUrl::new(5, Some(6))
        );
        assert!(!port.resolve_url("https://example.com/").is_resolved());
        assert_eq!(client.backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_asset_uses_latest_version_and_ranks_images() {
        let backend = FakeBackend::new()
            .with_json("/models/100", fake_model_json(100, &[200, 150]))
            .with_json("/model-versions/200", fake_version_json(200))
            .with_json(
                "nsfw=true",
                json!({ "items": [
                    { "id": 1, "url": "https://img/1.jpeg", "stats": { "likeCount": 1 } }
                ]}),
            )
            .with_json(
                "nsfw=false",
                json!({ "items": [
                    { "id": 2, "url": "https://img/2.jpeg", "stats": { "heartCount": 4 } }
                ]}),
            );
        let client = fake_client(backend);

        let asset = client.fetch_asset(100, None, 9).await.unwrap();
        assert_eq!(asset.id, 100);
        assert_eq!(asset.version_id, 200);
        assert_eq!(asset.base_model, "SD 1.5");
        assert_eq!(asset.description, "A fine model");
        let ids: Vec<u64> = asset.images.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(
            client
                .backend
                .requested_urls()
                .iter()
                .filter(|u| u.contains("/images"))
                .all(|u| u.contains("modelVersionId=200"))
        );
    }

    #[tokio::test]
    async fn test_unknown_model_maps_to_not_found() {
        let client = fake_client(FakeBackend::new().with_json("/models/9", json!({})));
        let err = client.fetch_metadata(9, None).await.unwrap_err();
        assert!(matches!(err, CivitaiPortError::NotFound { .. }));
    }
}
