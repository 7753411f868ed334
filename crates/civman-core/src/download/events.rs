//! Queue notifications.
//!
//! The queue publishes a [`QueueEvent`] after every mutation so observers
//! (terminal renderer, tests) can refresh incrementally instead of polling.

use serde::{Deserialize, Serialize};

use super::types::{DownloadTask, TaskStage};

/// Notification emitted by the download queue and orchestrator.
///
/// Every variant carries the task URL explicitly when it concerns a single
/// task, so observers never have to infer which download is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// The set of tasks changed (enqueue, completion, clear).
    QueueChanged {
        /// Queued plus downloading tasks.
        active: usize,
        /// All tasks still visible.
        total: usize,
    },

    /// A single task changed status or progress.
    TaskChanged {
        /// Snapshot of the task after the change.
        task: DownloadTask,
    },

    /// The orchestrator moved a task to a new pipeline stage.
    StageChanged {
        /// Task URL.
        url: String,
        /// New stage.
        stage: TaskStage,
    },
}

impl QueueEvent {
    /// Create a queue-changed event.
    #[must_use]
    pub const fn queue_changed(active: usize, total: usize) -> Self {
        Self::QueueChanged { active, total }
    }

    /// Create a task-changed event.
    #[must_use]
    pub const fn task_changed(task: DownloadTask) -> Self {
        Self::TaskChanged { task }
    }

    /// Create a stage-changed event.
    pub fn stage_changed(url: impl Into<String>, stage: TaskStage) -> Self {
        Self::StageChanged {
            url: url.into(),
            stage,
        }
    }

    /// URL of the task this event concerns, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::QueueChanged { .. } => None,
            Self::TaskChanged { task } => Some(&task.url),
            Self::StageChanged { url, .. } => Some(url),
        }
    }

    /// Event name for logging.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::QueueChanged { .. } => "queue:changed",
            Self::TaskChanged { .. } => "queue:task_changed",
            Self::StageChanged { .. } => "queue:stage_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_url() {
        let task = DownloadTask::new("https://civitai.com/models/5");
        assert_eq!(
            QueueEvent::task_changed(task).url(),
            Some("https://civitai.com/models/5")
        );
        assert_eq!(QueueEvent::queue_changed(1, 2).url(), None);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = QueueEvent::stage_changed("u", TaskStage::FetchingImages);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "stage_changed");
        assert_eq!(json["stage"], "fetching_images");
        assert_eq!(event.event_name(), "queue:stage_changed");
    }
}
