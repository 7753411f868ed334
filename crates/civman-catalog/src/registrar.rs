//! Catalog-backed implementation of `AssetRegistrarPort`.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use civman_core::{AssetRecord, AssetRegistrarPort, RegistrarError};
use tracing::info;

use crate::error::CatalogResult;
use crate::store::{CatalogStore, Upsert};

/// A catalog shared between the orchestrator and the rest of the process.
///
/// Registration upserts and saves immediately, so a completed download is
/// on disk even if the process is killed afterwards. The save runs on the
/// blocking pool.
#[derive(Debug, Clone)]
pub struct SharedCatalog {
    inner: Arc<Mutex<CatalogStore>>,
}

impl SharedCatalog {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store. A poisoned lock is recovered; the store holds no
    /// invariants a panic could break halfway.
    pub fn lock(&self) -> MutexGuard<'_, CatalogStore> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Save pending changes.
    pub fn flush(&self) -> CatalogResult<()> {
        let mut store = self.lock();
        if store.is_dirty() {
            store.save()?;
        }
        Ok(())
    }
}

#[async_trait]
impl AssetRegistrarPort for SharedCatalog {
    async fn register_asset(&self, asset: &AssetRecord) -> Result<(), RegistrarError> {
        let catalog = self.clone();
        let record = asset.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let mut store = catalog.lock();
            let outcome = store.upsert(record);
            store.save().map(|()| outcome)
        })
        .await
        .map_err(|e| RegistrarError::new(format!("Catalog save task failed: {e}")))?
        .map_err(|e| RegistrarError::new(e.to_string()))?;
        info!(
            model_id = asset.id,
            inserted = outcome == Upsert::Inserted,
            "Registered asset in catalog"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_register_saves_immediately() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let catalog = SharedCatalog::new(CatalogStore::empty(&path));

        catalog.register_asset(&AssetRecord::new(5)).await.unwrap();
        catalog.register_asset(&AssetRecord::new(5)).await.unwrap();

        assert!(!catalog.lock().is_dirty());
        let reopened = CatalogStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.contains(5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_registrations_all_land() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let catalog = SharedCatalog::new(CatalogStore::empty(&path));

        let handles: Vec<_> = (1..=8)
            .map(|id| {
                let catalog = catalog.clone();
                tokio::spawn(async move { catalog.register_asset(&AssetRecord::new(id)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = CatalogStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 8);
        assert!((1..=8).all(|id| reopened.contains(id)));
    }

    #[tokio::test]
    async fn test_register_reports_save_failure() {
        let dir = tempdir().unwrap();
        // a directory where the catalog file should be
        let path = dir.path().join("db.json");
        std::fs::create_dir_all(&path).unwrap();
        let catalog = SharedCatalog::new(CatalogStore::empty(&path));

        let err = catalog.register_asset(&AssetRecord::new(1)).await.unwrap_err();
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_flush_only_when_dirty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let catalog = SharedCatalog::new(CatalogStore::empty(&path));
        catalog.flush().unwrap();
        assert!(!path.exists());

        catalog.lock().upsert(AssetRecord::new(2));
        catalog.flush().unwrap();
        assert!(path.exists());
    }
}
