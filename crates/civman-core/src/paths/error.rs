//! Errors for data-root and destination folder handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    /// No home directory and no `CIVMAN_DATA_DIR` override.
    #[error("Cannot locate the data directory; set CIVMAN_DATA_DIR or HOME")]
    NoHomeDir,

    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("Cannot create folder {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },
}
