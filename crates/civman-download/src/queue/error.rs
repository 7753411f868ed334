//! Queue state errors.

use civman_core::{DownloadError, DownloadStatus};
use thiserror::Error;

/// Rejected queue mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Not in queue: {url}")]
    NotInQueue { url: String },

    #[error("Cannot move {url} from {from} to {to}")]
    InvalidTransition {
        url: String,
        from: DownloadStatus,
        to: DownloadStatus,
    },

    #[error("Another download is active: {active}")]
    Busy { active: String },
}

impl From<QueueError> for DownloadError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::NotInQueue { url } => Self::NotInQueue { url },
            other => Self::other(other.to_string()),
        }
    }
}
