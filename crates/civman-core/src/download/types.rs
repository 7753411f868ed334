//! Download task records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a queued download.
///
/// Transitions only move forward:
/// `Queued -> Downloading -> {Completed | Failed | Canceled}`, with
/// `Queued -> Canceled` allowed for tasks that never started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Queued,
    Downloading,
    Completed,
    Failed,
    Canceled,
}

impl DownloadStatus {
    /// Convert to string for display/serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Downloading => "downloading",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    /// Terminal states never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }

    /// Queued or downloading.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Whether moving from `self` to `next` respects the forward-only rule.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Downloading | Self::Canceled)
                | (
                    Self::Downloading,
                    Self::Completed | Self::Failed | Self::Canceled
                )
        )
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step of the per-URL orchestration pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStage {
    Queued,
    Resolving,
    FetchingMetadata,
    FetchingImages,
    DownloadingFile,
    DownloadingImages,
    Completed,
    Failed,
    Canceled,
}

impl TaskStage {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Resolving => "resolving URL",
            Self::FetchingMetadata => "fetching metadata",
            Self::FetchingImages => "fetching images",
            Self::DownloadingFile => "downloading model",
            Self::DownloadingImages => "downloading images",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }
}

/// Live state of one queue entry, keyed by its source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    pub url: String,
    pub status: DownloadStatus,
    pub stage: TaskStage,
    /// Model file progress, 0-100 once the transfer has started.
    pub model_progress: Option<u8>,
    /// Image set progress, 0-100 once image downloads have started.
    pub image_progress: Option<u8>,
    pub queued_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
    /// Catalog id of the asset, once the task completed successfully.
    pub model_id: Option<u64>,
    pub model_name: Option<String>,
}

impl DownloadTask {
    /// Fresh task in the `Queued` state.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: DownloadStatus::Queued,
            stage: TaskStage::Queued,
            model_progress: None,
            image_progress: None,
            queued_at: Utc::now(),
            finished_at: None,
            message: None,
            model_id: None,
            model_name: None,
        }
    }

    /// Queued or downloading.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        use DownloadStatus::{Canceled, Completed, Downloading, Failed, Queued};

        assert!(Queued.can_transition_to(Downloading));
        assert!(Queued.can_transition_to(Canceled));
        assert!(Downloading.can_transition_to(Completed));
        assert!(Downloading.can_transition_to(Failed));
        assert!(Downloading.can_transition_to(Canceled));
    }

    #[test]
    fn test_no_backwards_transitions() {
        use DownloadStatus::{Canceled, Completed, Downloading, Failed, Queued};

        for terminal in [Completed, Failed, Canceled] {
            assert!(!terminal.can_transition_to(Queued));
            assert!(!terminal.can_transition_to(Downloading));
        }
        assert!(!Downloading.can_transition_to(Queued));
        assert!(!Queued.can_transition_to(Completed));
        assert!(!Queued.can_transition_to(Failed));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&DownloadStatus::Canceled).unwrap();
        assert_eq!(json, "\"canceled\"");
        assert_eq!(DownloadStatus::Downloading.to_string(), "downloading");
    }

    #[test]
    fn test_new_task_is_queued() {
        let task = DownloadTask::new("https://civitai.com/models/1");
        assert_eq!(task.status, DownloadStatus::Queued);
        assert_eq!(task.stage, TaskStage::Queued);
        assert!(task.is_active());
        assert!(task.model_progress.is_none());
    }
}
