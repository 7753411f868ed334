//! Error types for Civitai port operations.

use thiserror::Error;

/// Errors from Civitai port operations.
///
/// Implementation-specific errors (HTTP, JSON, filesystem) are mapped to
/// these at the adapter boundary.
#[derive(Debug, Error)]
pub enum CivitaiPortError {
    /// The requested model or version does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing resource
        what: String,
    },

    /// Network or connectivity error, including non-2xx responses.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
        /// HTTP status, when a response was received
        status: Option<u16>,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {message}")]
    InvalidResponse {
        /// What was invalid
        message: String,
    },

    /// Local filesystem error while writing a download.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the failure
        message: String,
    },

    /// Caller supplied unusable input (e.g. a URL without a file name).
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong
        message: String,
    },

    /// API rate limit exceeded.
    #[error("Rate limit exceeded, try again later")]
    RateLimited,

    /// The resource needs an API key.
    #[error("Authentication required: {what}")]
    AuthRequired {
        /// The resource that requires auth
        what: String,
    },
}

impl CivitaiPortError {
    /// HTTP status associated with the error, when there is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            Self::RateLimited => Some(429),
            Self::AuthRequired { .. } => Some(401),
            _ => None,
        }
    }
}

/// Result type alias for Civitai port operations.
pub type CivitaiPortResult<T> = Result<T, CivitaiPortError>;
