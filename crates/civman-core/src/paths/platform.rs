//! Per-user file locations.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable that relocates the config and catalog files.
pub const DATA_DIR_ENV: &str = "CIVMAN_DATA_DIR";

/// Configuration file name, stored in the data root.
pub const CONFIG_FILE_NAME: &str = ".civitai_model_manager.json";

/// Catalog file name, stored in the data root.
pub const CATALOG_FILE_NAME: &str = ".civitai_models_db.json";

/// Directory holding the config and catalog files.
///
/// Resolution order:
/// 1. `CIVMAN_DATA_DIR` environment variable
/// 2. The user's home directory
pub fn data_root() -> Result<PathBuf, PathError> {
    resolve_root(env::var(DATA_DIR_ENV).ok().as_deref(), dirs::home_dir())
}

fn resolve_root(override_dir: Option<&str>, home: Option<PathBuf>) -> Result<PathBuf, PathError> {
    if let Some(dir) = override_dir.map(str::trim).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home.ok_or(PathError::NoHomeDir)
}

/// Path of the JSON configuration file.
pub fn config_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(CONFIG_FILE_NAME))
}

/// Path of the JSON catalog file.
pub fn catalog_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(CATALOG_FILE_NAME))
}

/// Create `path` (and parents) if needed and check that it is a directory.
pub fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_override_wins() {
        let root = resolve_root(Some("/tmp/civman"), Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/civman"));
    }

    #[test]
    fn test_blank_override_falls_back_to_home() {
        let root = resolve_root(Some("  "), Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(root, PathBuf::from("/home/u"));
        assert!(matches!(resolve_root(None, None), Err(PathError::NoHomeDir)));
    }

    #[test]
    fn test_ensure_directory_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_directory(&nested).unwrap();
    }

    #[test]
    fn test_ensure_directory_rejects_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            ensure_directory(&file),
            Err(PathError::NotADirectory(_))
        ));
    }
}
