//! Civitai client port trait.

use std::path::Path;

use async_trait::async_trait;

use super::error::CivitaiPortResult;
use super::types::{FileFetch, ModelSummary, ResolvedUrl, SearchOptions};
use crate::domain::{AssetRecord, ImageRecord};

/// Progress observer for file transfers, called with a whole percentage.
pub type ProgressFn = dyn Fn(u8) + Send + Sync;

/// Port trait for model platform operations.
///
/// All network calls made through one implementation share a single
/// rate-limiting gate.
#[async_trait]
pub trait CivitaiClientPort: Send + Sync {
    /// Extract `(model id, version id)` from a model page URL.
    ///
    /// Never touches the network. An unresolved result is an input error.
    fn resolve_url(&self, url: &str) -> ResolvedUrl;

    /// Fetch model and version metadata without the image gallery.
    ///
    /// When `version_id` is `None` the first (latest) version listed by the
    /// platform is used.
    async fn fetch_metadata(
        &self,
        model_id: u64,
        version_id: Option<u64>,
    ) -> CivitaiPortResult<AssetRecord>;

    /// Fetch, merge and rank the gallery of a model version.
    ///
    /// Never fails: fetch errors are logged and whatever was collected is
    /// returned. The result holds at most `max_images` entries.
    async fn fetch_images(
        &self,
        model_id: u64,
        version_id: Option<u64>,
        max_images: usize,
    ) -> Vec<ImageRecord>;

    /// Fetch metadata and the ranked gallery in one call.
    async fn fetch_asset(
        &self,
        model_id: u64,
        version_id: Option<u64>,
        max_images: usize,
    ) -> CivitaiPortResult<AssetRecord> {
        let mut asset = self.fetch_metadata(model_id, version_id).await?;
        asset.images = self
            .fetch_images(model_id, Some(asset.version_id), max_images)
            .await;
        Ok(asset)
    }

    /// Search the platform catalog.
    async fn search(&self, options: &SearchOptions) -> CivitaiPortResult<Vec<ModelSummary>>;

    /// Stream a file into `dest_dir`.
    ///
    /// If the target file already exists no transfer happens and
    /// [`FileFetch::AlreadyPresent`] is returned.
    async fn download_file(
        &self,
        url: &str,
        dest_dir: &Path,
        on_progress: Option<&ProgressFn>,
    ) -> CivitaiPortResult<FileFetch>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // Verify the trait is object-safe
    fn _assert_object_safe(_: Arc<dyn CivitaiClientPort>) {}
}
