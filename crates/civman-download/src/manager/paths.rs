//! Where a model's files land.

use std::path::{Path, PathBuf};

use civman_core::{
    AssetRecord, DownloadError, DownloadResult, IMAGES_DIR_NAME, METADATA_FILE_NAME, model_folder,
};

/// Planned folder for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDestination {
    pub folder: PathBuf,
}

impl ModelDestination {
    /// `root/<category folder>/<base model>/<sanitized name>`.
    pub fn plan(root: &Path, asset: &AssetRecord) -> Self {
        Self {
            folder: model_folder(root, asset.category, &asset.base_model, &asset.name),
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.folder.join(IMAGES_DIR_NAME)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.folder.join(METADATA_FILE_NAME)
    }

    pub async fn ensure_dir(&self) -> DownloadResult<()> {
        create_dir(&self.folder).await
    }

    pub async fn ensure_images_dir(&self) -> DownloadResult<()> {
        create_dir(&self.images_dir()).await
    }

    /// Write the asset document as pretty JSON next to the model file.
    pub async fn write_metadata(&self, asset: &AssetRecord) -> DownloadResult<()> {
        let document = asset
            .to_document()
            .and_then(|doc| serde_json::to_string_pretty(&doc))
            .map_err(|e| DownloadError::other(format!("Cannot serialize metadata: {e}")))?;
        tokio::fs::write(self.metadata_path(), document)
            .await
            .map_err(|e| DownloadError::from_io_error(&e))
    }
}

async fn create_dir(path: &Path) -> DownloadResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| DownloadError::io("create_dir", format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use civman_core::ModelCategory;

    #[test]
    fn test_plan_follows_layout() {
        let asset = AssetRecord {
            name: "Detail Tweaker".to_string(),
            category: ModelCategory::Lora,
            base_model: "SD 1.5".to_string(),
            ..AssetRecord::new(7)
        };
        let dest = ModelDestination::plan(Path::new("/comfy"), &asset);
        assert_eq!(
            dest.folder,
            PathBuf::from("/comfy/models/Lora/SD 1.5/Detail_Tweaker")
        );
        assert_eq!(
            dest.metadata_path(),
            PathBuf::from("/comfy/models/Lora/SD 1.5/Detail_Tweaker/metadata.json")
        );
    }

    #[tokio::test]
    async fn test_write_metadata_includes_page_url() {
        let root = tempfile::tempdir().unwrap();
        let asset = AssetRecord {
            name: "Emb".to_string(),
            category: ModelCategory::TextualInversion,
            ..AssetRecord::new(12)
        };
        let dest = ModelDestination::plan(root.path(), &asset);
        dest.ensure_dir().await.unwrap();
        dest.write_metadata(&asset).await.unwrap();

        let text = std::fs::read_to_string(dest.metadata_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["id"], 12);
        assert_eq!(value["url"], "https://civitai.com/models/12");
        assert!(dest.folder.starts_with(root.path().join("embeddings")));
    }
}
