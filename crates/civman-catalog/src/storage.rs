//! Model folders on disk.

use std::fs;
use std::path::{Path, PathBuf};

use civman_core::{AssetRecord, METADATA_FILE_NAME, ModelCategory, StorageGroup, model_folder};
use serde_json::Value;
use sysinfo::Disks;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::error::{CatalogError, CatalogResult};

// ============================================================================
// Usage
// ============================================================================

/// Disk totals plus bytes used per storage group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageReport {
    /// Capacity of the disk holding the root.
    pub total: u64,
    /// Free space on that disk.
    pub available: u64,
    /// Bytes per group, always in the order LoRAs, Checkpoints, Embeddings, Other.
    pub groups: Vec<(StorageGroup, u64)>,
}

impl StorageReport {
    pub fn used_by_models(&self) -> u64 {
        self.groups.iter().map(|(_, bytes)| bytes).sum()
    }
}

/// Measure the destination root.
pub fn storage_usage(root: &Path) -> CatalogResult<StorageReport> {
    if !root.is_dir() {
        error!(root = %root.display(), "Destination directory not found");
        return Err(CatalogError::MissingRoot(root.to_path_buf()));
    }

    let (total, available) = disk_space(root);

    let mut groups = vec![
        (StorageGroup::Loras, 0),
        (StorageGroup::Checkpoints, 0),
        (StorageGroup::Embeddings, 0),
        (StorageGroup::Other, 0),
    ];
    for (folder, group) in category_folders() {
        let path = root.join(folder);
        if !path.is_dir() {
            continue;
        }
        let size = folder_size(&path);
        if let Some(slot) = groups.iter_mut().find(|(g, _)| *g == group) {
            slot.1 += size;
        }
    }

    Ok(StorageReport {
        total,
        available,
        groups,
    })
}

/// Total and available bytes of the disk whose mount point is the longest
/// prefix of `path`.
fn disk_space(path: &Path) -> (u64, u64) {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let disks = Disks::new_with_refreshed_list();

    disks
        .list()
        .iter()
        .filter(|disk| target.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map_or((0, 0), |disk| (disk.total_space(), disk.available_space()))
}

/// Sum of file sizes below `path`. Unreadable entries are skipped.
pub fn folder_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// Each distinct category folder with the group it counts toward.
fn category_folders() -> Vec<(&'static str, StorageGroup)> {
    let mut folders: Vec<(&'static str, StorageGroup)> = Vec::new();
    for category in ModelCategory::ALL {
        if !folders.iter().any(|(f, _)| *f == category.folder()) {
            folders.push((category.folder(), category.storage_group()));
        }
    }
    folders
}

// ============================================================================
// Metadata scan
// ============================================================================

fn metadata_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == METADATA_FILE_NAME)
        .map(walkdir::DirEntry::into_path)
}

fn read_metadata(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path)
        .inspect_err(|e| warn!(path = %path.display(), error = %e, "Cannot read metadata file"))
        .ok()?;
    serde_json::from_str(&content)
        .inspect_err(|e| warn!(path = %path.display(), error = %e, "Invalid metadata file"))
        .ok()
}

/// Collect records from every `metadata.json` under the category folders.
///
/// Only files carrying both `id` and `name` count.
pub fn scan_metadata(root: &Path) -> CatalogResult<Vec<AssetRecord>> {
    if !root.is_dir() {
        error!(root = %root.display(), "Destination directory not found");
        return Err(CatalogError::MissingRoot(root.to_path_buf()));
    }

    let mut records = Vec::new();
    for (folder, _) in category_folders() {
        let dir = root.join(folder);
        if !dir.is_dir() {
            continue;
        }
        for path in metadata_files(&dir) {
            let Some(value) = read_metadata(&path) else {
                continue;
            };
            if value.get("id").is_none() || value.get("name").is_none() {
                debug!(path = %path.display(), "Metadata without id or name, skipping");
                continue;
            }
            match serde_json::from_value::<AssetRecord>(value) {
                Ok(record) if record.id != 0 => records.push(record),
                Ok(_) => debug!(path = %path.display(), "Metadata with unusable id, skipping"),
                Err(e) => warn!(path = %path.display(), error = %e, "Cannot read metadata record"),
            }
        }
    }

    info!(count = records.len(), "Scanned model metadata");
    Ok(records)
}

// ============================================================================
// Lookup and deletion
// ============================================================================

/// Folder holding a model's files.
///
/// Tries the layout the downloader writes first, then any `metadata.json`
/// under the category folder whose id matches.
pub fn find_model_path(root: &Path, record: &AssetRecord) -> Option<PathBuf> {
    let expected = model_folder(root, record.category, &record.base_model, &record.name);
    if expected.is_dir() {
        return Some(expected);
    }

    let category_dir = root.join(record.category.folder());
    if !category_dir.is_dir() {
        return None;
    }
    metadata_files(&category_dir)
        .find(|path| {
            read_metadata(path)
                .and_then(|v| v.get("id").and_then(id_value))
                .is_some_and(|id| id == record.id)
        })
        .and_then(|path| path.parent().map(Path::to_path_buf))
}

fn id_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Delete a model folder (or a single file).
pub fn delete_model_files(path: &Path) -> CatalogResult<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| CatalogError::io(path, e))?;
    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|e| CatalogError::io(path, e))?;
    info!(path = %path.display(), "Deleted model files");
    Ok(())
}
