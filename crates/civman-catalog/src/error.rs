//! Catalog error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised by the catalog and storage helpers.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A catalog or import file is not valid JSON.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An import document has the wrong shape.
    #[error("Invalid catalog document: {0}")]
    InvalidDocument(String),

    /// No catalog entry with this id.
    #[error("Model {0} is not in the catalog")]
    NotFound(u64),

    /// A field update was rejected.
    #[error("Cannot update field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// The destination root does not exist.
    #[error("Directory not found: {0}")]
    MissingRoot(PathBuf),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
