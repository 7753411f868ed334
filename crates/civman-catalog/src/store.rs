//! JSON-backed catalog of downloaded models.
//!
//! The file maps string ids to serialized [`AssetRecord`]s (plus a derived
//! `url`). Entries keep their insertion order across load and save.

use std::fs;
use std::path::{Path, PathBuf};

use civman_core::{AssetRecord, timestamp_now};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::storage::scan_metadata;

/// Outcome of [`CatalogStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// The local catalog.
///
/// Mutations only touch memory; call [`save`](Self::save) or
/// [`close`](Self::close) to persist them.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    entries: IndexMap<u64, AssetRecord>,
    dirty: bool,
}

impl CatalogStore {
    /// Open the catalog at `path`. A missing file yields an empty catalog.
    ///
    /// Entries that cannot be read are skipped with a warning; a file that is
    /// not a JSON object at all is an error so it never gets overwritten.
    pub fn open(path: impl Into<PathBuf>) -> CatalogResult<Self> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Catalog file not found, starting with an empty catalog");
                return Ok(Self::empty(path));
            }
            Err(e) => return Err(CatalogError::io(&path, e)),
        };

        let document: Value = serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.clone(),
            source,
        })?;
        let Value::Object(document) = document else {
            return Err(CatalogError::InvalidDocument(format!(
                "{} is not a JSON object",
                path.display()
            )));
        };

        let mut store = Self::empty(path);
        for (key, value) in document {
            match parse_entry(&key, value) {
                Some(record) => {
                    store.entries.insert(record.id, record);
                }
                None => warn!(key = %key, "Skipping unreadable catalog entry"),
            }
        }
        info!(count = store.entries.len(), "Loaded models from catalog");
        Ok(store)
    }

    /// An empty catalog that will be written to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: IndexMap::new(),
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether there are unsaved changes.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, id: u64) -> Option<&AssetRecord> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// All records in catalog order.
    pub fn list(&self) -> impl Iterator<Item = &AssetRecord> {
        self.entries.values()
    }

    /// Insert or replace the record with the same id.
    ///
    /// Replacing keeps the stored `favorite` flag, and once a record has a
    /// size and download date those are never replaced.
    pub fn upsert(&mut self, mut record: AssetRecord) -> Upsert {
        self.dirty = true;
        match self.entries.get_mut(&record.id) {
            Some(existing) => {
                record.favorite = existing.favorite;
                if existing.is_downloaded() {
                    record.size = existing.size;
                    record.download_date.clone_from(&existing.download_date);
                }
                debug!(model_id = record.id, "Updated catalog entry");
                *existing = record;
                Upsert::Updated
            }
            None => {
                debug!(model_id = record.id, "Added catalog entry");
                self.entries.insert(record.id, record);
                Upsert::Inserted
            }
        }
    }

    /// Remove an entry, returning it.
    pub fn remove(&mut self, id: u64) -> Option<AssetRecord> {
        let removed = self.entries.shift_remove(&id);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Set one field of a stored record.
    ///
    /// The record round-trips through its document form, so `field` uses
    /// the persisted key names. The id cannot be changed, and size and
    /// download date are frozen once the model is downloaded.
    pub fn update_field(&mut self, id: u64, field: &str, value: Value) -> CatalogResult<()> {
        if field == "id" || field == "url" {
            return Err(CatalogError::InvalidField {
                field: field.to_string(),
                reason: "derived from the model id".to_string(),
            });
        }
        let record = self.entries.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        if (field == "size" || field == "download_date") && record.is_downloaded() {
            return Err(CatalogError::InvalidField {
                field: field.to_string(),
                reason: "set once when the download finished".to_string(),
            });
        }

        let mut document = serde_json::to_value(&*record)?;
        if let Value::Object(ref mut map) = document {
            map.insert(field.to_string(), value);
        }
        let updated: AssetRecord =
            serde_json::from_value(document).map_err(|e| CatalogError::InvalidField {
                field: field.to_string(),
                reason: e.to_string(),
            })?;

        *record = updated;
        self.dirty = true;
        Ok(())
    }

    /// Mark or unmark a favorite, stamping `last_updated`.
    pub fn set_favorite(&mut self, id: u64, favorite: bool) -> CatalogResult<()> {
        self.update_field(id, "favorite", Value::Bool(favorite))?;
        self.update_field(id, "last_updated", Value::String(timestamp_now()))
    }

    /// Replace entries from an exported document.
    ///
    /// Keys are model ids; existing entries with the same id are replaced
    /// wholesale. Returns the number of entries imported.
    pub fn import_document(&mut self, document: Value) -> CatalogResult<usize> {
        let Value::Object(map) = document else {
            return Err(CatalogError::InvalidDocument(
                "expected an object keyed by model id".to_string(),
            ));
        };

        let mut imported = 0;
        for (key, value) in map {
            match parse_entry(&key, value) {
                Some(record) => {
                    self.entries.insert(record.id, record);
                    imported += 1;
                }
                None => warn!(key = %key, "Skipping unreadable import entry"),
            }
        }
        if imported > 0 {
            self.dirty = true;
        }
        info!(count = imported, "Imported catalog entries");
        Ok(imported)
    }

    /// Read an exported catalog file and merge it.
    pub fn import_file(&mut self, path: &Path) -> CatalogResult<usize> {
        let document = read_export(path)?;
        self.import_document(document)
    }

    /// Upsert every record found by a `metadata.json` scan of `root`.
    pub fn rescan(&mut self, root: &Path) -> CatalogResult<usize> {
        let records = scan_metadata(root)?;
        let count = records.len();
        for record in records {
            self.upsert(record);
        }
        info!(count, "Rescan complete");
        Ok(count)
    }

    /// The catalog as a JSON document.
    pub fn to_document(&self) -> CatalogResult<Value> {
        let mut map = Map::with_capacity(self.entries.len());
        for (id, record) in &self.entries {
            map.insert(id.to_string(), record.to_document()?);
        }
        Ok(Value::Object(map))
    }

    /// Write the catalog to another file.
    pub fn export(&self, path: &Path) -> CatalogResult<()> {
        write_document(path, &self.to_document()?)?;
        info!(path = %path.display(), count = self.entries.len(), "Exported catalog");
        Ok(())
    }

    /// Persist to the catalog file.
    pub fn save(&mut self) -> CatalogResult<()> {
        write_document(&self.path, &self.to_document()?)?;
        self.dirty = false;
        info!(path = %self.path.display(), "Catalog saved");
        Ok(())
    }

    /// Flush pending changes and drop the store.
    pub fn close(mut self) -> CatalogResult<()> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }
}

/// Parse one `id -> record` pair. The key wins when the record has no id.
fn parse_entry(key: &str, value: Value) -> Option<AssetRecord> {
    let mut record: AssetRecord = serde_json::from_value(value).ok()?;
    if record.id == 0 {
        record.id = key.trim().parse().ok()?;
    }
    (record.id != 0).then_some(record)
}

/// Read an exported catalog without merging it.
pub fn read_export(path: &Path) -> CatalogResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `document` to a sibling temp file, then rename over `path`.
fn write_document(path: &Path, document: &Value) -> CatalogResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
    }
    let content = serde_json::to_string_pretty(document)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content).map_err(|e| CatalogError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| CatalogError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use civman_core::ModelCategory;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(id: u64, name: &str) -> AssetRecord {
        AssetRecord {
            name: name.to_string(),
            category: ModelCategory::Lora,
            ..AssetRecord::new(id)
        }
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = CatalogStore::open(dir.path().join("db.json")).unwrap();
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_save_and_reopen_keeps_order_and_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let mut store = CatalogStore::empty(&path);
        store.upsert(record(20, "second"));
        store.upsert(record(10, "first"));
        store.save().unwrap();
        assert!(!store.is_dirty());

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["20"]["url"], "https://civitai.com/models/20");
        assert_eq!(raw["20"]["type"], "LORA");

        let reopened = CatalogStore::open(&path).unwrap();
        let ids: Vec<u64> = reopened.list().map(|r| r.id).collect();
        assert_eq!(ids, vec![20, 10]);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut store = CatalogStore::empty("unused.json");
        assert_eq!(store.upsert(record(1, "a")), Upsert::Inserted);
        assert_eq!(store.upsert(record(1, "a")), Upsert::Updated);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1), Some(&record(1, "a")));
    }

    #[test]
    fn test_upsert_keeps_favorite_and_download_stamp() {
        let mut store = CatalogStore::empty("unused.json");
        let mut first = record(1, "a");
        first.mark_downloaded(4096, "2024-01-01 10:00:00");
        store.upsert(first);
        store.set_favorite(1, true).unwrap();

        let mut again = record(1, "renamed");
        again.mark_downloaded(1, "2025-05-05 05:05:05");
        store.upsert(again);

        let stored = store.get(1).unwrap();
        assert_eq!(stored.name, "renamed");
        assert!(stored.favorite);
        assert_eq!(stored.size, 4096);
        assert_eq!(stored.download_date, "2024-01-01 10:00:00");
    }

    #[test]
    fn test_set_favorite_stamps_last_updated() {
        let mut store = CatalogStore::empty("unused.json");
        store.upsert(record(3, "c"));
        store.set_favorite(3, true).unwrap();
        let stored = store.get(3).unwrap();
        assert!(stored.favorite);
        assert!(!stored.last_updated.is_empty());

        assert!(matches!(
            store.set_favorite(99, true),
            Err(CatalogError::NotFound(99))
        ));
    }

    #[test]
    fn test_update_field_rejects_bad_values() {
        let mut store = CatalogStore::empty("unused.json");
        store.upsert(record(4, "d"));

        assert!(matches!(
            store.update_field(4, "id", json!(5)),
            Err(CatalogError::InvalidField { .. })
        ));
        assert!(matches!(
            store.update_field(4, "size", json!("big")),
            Err(CatalogError::InvalidField { .. })
        ));
        store.update_field(4, "thumbnail", json!("/x/thumb.jpeg")).unwrap();
        assert_eq!(store.get(4).unwrap().thumbnail, "/x/thumb.jpeg");
    }

    #[test]
    fn test_update_field_keeps_download_facts() {
        let mut store = CatalogStore::empty("unused.json");
        let mut downloaded = record(9, "i");
        downloaded.mark_downloaded(1000, "2024-03-03 03:03:03");
        store.upsert(downloaded);

        assert!(matches!(
            store.update_field(9, "size", json!(0)),
            Err(CatalogError::InvalidField { .. })
        ));
        assert!(matches!(
            store.update_field(9, "download_date", json!("")),
            Err(CatalogError::InvalidField { .. })
        ));
        let stored = store.get(9).unwrap();
        assert_eq!(stored.size, 1000);
        assert_eq!(stored.download_date, "2024-03-03 03:03:03");

        store.upsert(record(10, "j"));
        store.update_field(10, "size", json!(12)).unwrap();
        assert_eq!(store.get(10).unwrap().size, 12);
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let mut store = CatalogStore::empty(dir.path().join("db.json"));
        store.upsert(record(5, "e"));
        store.save().unwrap();
        assert!(store.remove(6).is_none());
        assert!(!store.is_dirty());
        assert_eq!(store.remove(5).map(|r| r.id), Some(5));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_open_tolerates_missing_fields_and_bad_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(
            &path,
            json!({
                "7": { "name": "Legacy", "favorite": "True", "future_field": 1 },
                "oops": { "name": "No id" },
                "8": "not an object"
            })
            .to_string(),
        )
        .unwrap();

        let store = CatalogStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        let legacy = store.get(7).unwrap();
        assert_eq!(legacy.name, "Legacy");
        assert_eq!(legacy.base_model, "unknown");
        assert!(legacy.favorite);
    }

    #[test]
    fn test_open_rejects_non_object_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            CatalogStore::open(&path),
            Err(CatalogError::InvalidDocument(_))
        ));

        fs::write(&path, "{ broken").unwrap();
        assert!(matches!(
            CatalogStore::open(&path),
            Err(CatalogError::Parse { .. })
        ));
    }

    #[test]
    fn test_export_then_import_into_other_store() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("export.json");

        let mut source = CatalogStore::empty(dir.path().join("a.json"));
        source.upsert(record(1, "one"));
        source.upsert(record(2, "two"));
        source.export(&export).unwrap();

        let mut target = CatalogStore::empty(dir.path().join("b.json"));
        target.upsert(record(2, "old two"));
        let imported = target.import_file(&export).unwrap();

        assert_eq!(imported, 2);
        assert_eq!(target.len(), 2);
        assert_eq!(target.get(2).unwrap().name, "two");
    }

    #[test]
    fn test_rescan_keeps_favorites() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("models/Lora/SD 1.5/a");
        fs::create_dir_all(&folder).unwrap();
        fs::write(
            folder.join("metadata.json"),
            json!({ "id": 1, "name": "a (rescanned)", "type": "LORA" }).to_string(),
        )
        .unwrap();

        let mut store = CatalogStore::empty(dir.path().join("db.json"));
        store.upsert(record(1, "a"));
        store.set_favorite(1, true).unwrap();

        assert_eq!(store.rescan(dir.path()).unwrap(), 1);
        let stored = store.get(1).unwrap();
        assert_eq!(stored.name, "a (rescanned)");
        assert!(stored.favorite);
        assert!(store.rescan(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_import_rejects_non_object() {
        let mut store = CatalogStore::empty("unused.json");
        assert!(matches!(
            store.import_document(json!([1, 2, 3])),
            Err(CatalogError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_close_flushes_pending_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut store = CatalogStore::open(&path).unwrap();
        store.upsert(record(9, "nine"));
        store.close().unwrap();

        let reopened = CatalogStore::open(&path).unwrap();
        assert!(reopened.contains(9));
        assert!(!dir.path().join("db.json.tmp").exists());
    }
}
