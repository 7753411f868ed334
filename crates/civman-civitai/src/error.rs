//! Internal error types for Civitai operations.
//!
//! These errors are internal to `civman-civitai` and are mapped to
//! `CivitaiPortError` at the port boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Civitai operations.
pub type CivitaiResult<T> = Result<T, CivitaiError>;

/// Errors related to Civitai API operations.
#[derive(Debug, Error)]
pub enum CivitaiError {
    /// API request failed with an HTTP error status.
    #[error("Civitai API request failed with status {status}: {url}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// API returned an invalid or unexpected response.
    #[error("Invalid response from Civitai API: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// The API answered but the resource is absent.
    #[error("{what} not found on Civitai")]
    NotFound {
        /// What was looked up
        what: String,
    },

    /// No file name could be derived for a download.
    #[error("Cannot determine a file name for {url}")]
    MissingFileName {
        /// The download URL
        url: String,
    },

    /// Writing a download to disk failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// File being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The body stream ended with an error.
    #[error("Transfer interrupted: {message}")]
    Transfer {
        /// What went wrong
        message: String,
    },

    /// Building the HTTP client failed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl CivitaiError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_request_failed_error_message() {
        let error = CivitaiError::ApiRequestFailed {
            status: 503,
            url: "https://civitai.com/api/v1/models/1".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("civitai.com"));
    }

    #[test]
    fn test_not_found_message() {
        let error = CivitaiError::NotFound {
            what: "Model 42".to_string(),
        };
        assert_eq!(error.to_string(), "Model 42 not found on Civitai");
    }

    #[test]
    fn test_io_error_keeps_path() {
        let error = CivitaiError::io(
            "/tmp/x.part",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(error.to_string().contains("/tmp/x.part"));
    }
}
