//! Model and version metadata.

use civman_core::AssetRecord;
use tracing::info;

use super::CivitaiClient;
use crate::error::{CivitaiError, CivitaiResult};
use crate::http::HttpBackend;
use crate::parsing::{is_empty_response, parse_model, parse_version};
use crate::url::{build_model_url, build_version_url};

impl<B: HttpBackend> CivitaiClient<B> {
    /// Fetch model metadata plus the selected version, without images.
    ///
    /// With no explicit version the first listed version (the latest) is
    /// used.
    pub(crate) async fn fetch_model_metadata(
        &self,
        model_id: u64,
        version_id: Option<u64>,
    ) -> CivitaiResult<AssetRecord> {
        info!(model_id, "Fetching model information");

        let model_json = self
            .get_json(&build_model_url(&self.base_url, model_id))
            .await?;
        if is_empty_response(&model_json) {
            return Err(CivitaiError::NotFound {
                what: format!("Model {model_id}"),
            });
        }
        let model = parse_model(model_id, &model_json);

        let version_id = match version_id.filter(|v| *v != 0) {
            Some(id) => id,
            None => {
                let latest = model.version_ids.first().copied().ok_or_else(|| {
                    CivitaiError::NotFound {
                        what: format!("A version of model {model_id}"),
                    }
                })?;
                info!(model_id, version_id = latest, "Using latest version");
                latest
            }
        };

        let version_json = self
            .get_json(&build_version_url(&self.base_url, version_id))
            .await?;
        if is_empty_response(&version_json) {
            return Err(CivitaiError::NotFound {
                what: format!("Version {version_id}"),
            });
        }
        let version = parse_version(&version_json);

        Ok(AssetRecord {
            name: model.name,
            description: model.description,
            category: model.category,
            base_model: version.base_model,
            version_id,
            download_url: version.download_url,
            tags: version.trained_words,
            nsfw: model.nsfw,
            creator: model.creator,
            version_name: version.name,
            stats: model.stats,
            ..AssetRecord::new(model_id)
        })
    }
}
