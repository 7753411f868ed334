//! Download error types.
//!
//! These errors are serializable and do not hold `std::io::Error` or HTTP
//! client errors directly. I/O failures are captured as kind and message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::CivitaiPortError;

/// Error type for a single download task.
///
/// Every variant ends a task as `Failed` (or `Canceled` for
/// [`DownloadError::Cancelled`]); none of them stop queue processing.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadError {
    /// The URL did not match any known model URL shape.
    #[error("Unrecognized model URL: {url}")]
    InvalidUrl {
        /// The URL as submitted.
        url: String,
    },

    /// Writing the model, a gallery image or the sidecar failed.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// `std::io::ErrorKind` rendered as text.
        kind: String,
        /// Underlying error text.
        message: String,
    },

    /// Metadata request or file transfer failed on the wire.
    #[error("Network error: {message}")]
    Network {
        /// Underlying error text.
        message: String,
        /// Response status, when one was received.
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },

    /// Civitai has no such model or version.
    #[error("Not found: {message}")]
    NotFound {
        /// What was not found.
        message: String,
    },

    /// The destination root is missing or unusable.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong.
        message: String,
    },

    /// URL is already in the queue.
    #[error("Already queued: {url}")]
    AlreadyQueued {
        /// The duplicate URL.
        url: String,
    },

    /// URL is not in the queue.
    #[error("Not in queue: {url}")]
    NotInQueue {
        /// The missing URL.
        url: String,
    },

    /// Download was cancelled by the user.
    #[error("Download cancelled")]
    Cancelled,

    /// Persisting the catalog entry failed.
    #[error("Catalog error: {message}")]
    Catalog {
        /// Underlying error text.
        message: String,
    },

    /// General/uncategorized error.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl DownloadError {
    /// Create an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Create an I/O error from kind and message strings.
    pub fn io(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a network error with HTTP status code.
    pub fn network_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Network {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a catalog error.
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Input errors are never worth retrying.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. })
    }

    /// Check if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Convert to a user-friendly message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl { url } => format!("Invalid URL format: {url}"),
            Self::Io { message, .. } => format!("File operation failed: {message}"),
            Self::Network {
                message,
                status_code: Some(code),
            } => format!("Network error (HTTP {code}): {message}"),
            Self::Network { message, .. } => format!("Network error: {message}"),
            Self::NotFound { message } => format!("Failed to fetch model info: {message}"),
            Self::Configuration { message } => message.clone(),
            Self::AlreadyQueued { url } => format!("'{url}' is already in the queue."),
            Self::NotInQueue { url } => format!("'{url}' is not in the queue."),
            Self::Cancelled => "Download canceled".to_string(),
            Self::Catalog { message } => format!("Could not save catalog entry: {message}"),
            Self::Other { message } => message.clone(),
        }
    }
}

impl From<CivitaiPortError> for DownloadError {
    fn from(err: CivitaiPortError) -> Self {
        match err {
            CivitaiPortError::NotFound { what } => Self::not_found(what),
            CivitaiPortError::Network {
                message,
                status: Some(status),
            } => Self::network_with_status(message, status),
            CivitaiPortError::Network { message, .. } => Self::network(message),
            CivitaiPortError::RateLimited => {
                Self::network_with_status("rate limit exceeded", 429)
            }
            CivitaiPortError::AuthRequired { what } => {
                Self::network_with_status(format!("authentication required for {what}"), 401)
            }
            CivitaiPortError::Io { message } => Self::io("write", message),
            CivitaiPortError::InvalidResponse { message }
            | CivitaiPortError::InvalidInput { message } => Self::other(message),
        }
    }
}

/// Convenience result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;
