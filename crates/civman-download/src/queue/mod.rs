//! Download queue state.
//!
//! Pure synchronous state machine over the tasks, keyed by source URL in
//! insertion order. No I/O and no tracing happen here; the manager owns the
//! lock and publishes events for every mutation.
//!
//! # Rules
//!
//! - A URL appears at most once while the task is visible, whatever its status
//! - Status only moves forward (see [`DownloadStatus::can_transition_to`])
//! - At most one task is `Downloading` at a time

mod error;

use chrono::Utc;
use civman_core::{AssetRecord, DownloadStatus, DownloadTask, TaskStage};
use indexmap::IndexMap;

pub use error::QueueError;

/// Ordered set of download tasks.
#[derive(Debug, Default)]
pub struct DownloadQueue {
    tasks: IndexMap<String, DownloadTask>,
}

impl DownloadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visible tasks, finished ones included.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Add every URL not already present.
    ///
    /// Blank entries are ignored. Returns the URLs that were added, in order.
    pub fn enqueue<I, S>(&mut self, urls: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();
        for url in urls {
            let url = url.as_ref().trim();
            if url.is_empty() || self.tasks.contains_key(url) {
                continue;
            }
            self.tasks.insert(url.to_string(), DownloadTask::new(url));
            added.push(url.to_string());
        }
        added
    }

    pub fn get(&self, url: &str) -> Option<&DownloadTask> {
        self.tasks.get(url)
    }

    /// Oldest queued URL.
    pub fn next_url(&self) -> Option<&str> {
        self.tasks
            .values()
            .find(|task| task.status == DownloadStatus::Queued)
            .map(|task| task.url.as_str())
    }

    /// URL of the task currently downloading.
    pub fn active_url(&self) -> Option<&str> {
        self.tasks
            .values()
            .find(|task| task.status == DownloadStatus::Downloading)
            .map(|task| task.url.as_str())
    }

    /// Queued plus downloading tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.values().filter(|task| task.is_active()).count()
    }

    /// True when nothing is queued or downloading.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Snapshot of every task in queue order.
    pub fn all_tasks(&self) -> Vec<DownloadTask> {
        self.tasks.values().cloned().collect()
    }

    /// Move a queued task to `Downloading`.
    pub fn start(&mut self, url: &str) -> Result<&DownloadTask, QueueError> {
        if let Some(active) = self.active_url() {
            if active != url {
                return Err(QueueError::Busy {
                    active: active.to_string(),
                });
            }
        }
        let task = self.transition(url, DownloadStatus::Downloading)?;
        task.stage = TaskStage::Resolving;
        task.message = None;
        Ok(task)
    }

    /// Record the pipeline stage of the downloading task.
    pub fn set_stage(&mut self, url: &str, stage: TaskStage) -> Result<&DownloadTask, QueueError> {
        let task = self.downloading_mut(url)?;
        task.stage = stage;
        Ok(task)
    }

    /// Record model and image progress of the downloading task.
    ///
    /// `None` leaves the corresponding value unchanged. Values above 100 are
    /// clamped.
    pub fn update_progress(
        &mut self,
        url: &str,
        model: Option<u8>,
        images: Option<u8>,
    ) -> Result<&DownloadTask, QueueError> {
        let task = self.downloading_mut(url)?;
        if let Some(percent) = model {
            task.model_progress = Some(percent.min(100));
        }
        if let Some(percent) = images {
            task.image_progress = Some(percent.min(100));
        }
        Ok(task)
    }

    /// Finish the downloading task. A task that never started cannot be
    /// finished.
    ///
    /// On success the asset id and name are recorded on the task.
    pub fn complete(
        &mut self,
        url: &str,
        success: bool,
        message: Option<String>,
        asset: Option<&AssetRecord>,
    ) -> Result<&DownloadTask, QueueError> {
        let (status, stage) = if success {
            (DownloadStatus::Completed, TaskStage::Completed)
        } else {
            (DownloadStatus::Failed, TaskStage::Failed)
        };
        let task = self.transition(url, status)?;
        task.stage = stage;
        task.message = message;
        if let Some(asset) = asset {
            task.model_id = Some(asset.id);
            task.model_name = Some(asset.name.clone());
        }
        if success {
            task.model_progress = Some(100);
            task.image_progress = Some(100);
        }
        Ok(task)
    }

    /// Cancel a queued or downloading task.
    pub fn cancel(&mut self, url: &str) -> Result<&DownloadTask, QueueError> {
        let task = self.transition(url, DownloadStatus::Canceled)?;
        task.stage = TaskStage::Canceled;
        task.message = Some("Canceled".to_string());
        Ok(task)
    }

    /// Cancel the task only if it is the one downloading.
    ///
    /// Used when a worker stops on cancellation: a task queued again under
    /// the same URL after a `clear` is left alone.
    pub fn abort(&mut self, url: &str) -> Result<&DownloadTask, QueueError> {
        self.downloading_mut(url)?;
        self.cancel(url)
    }

    /// Cancel every active task and drop every task from the queue.
    ///
    /// Returns the URLs that were still active.
    pub fn clear(&mut self) -> Vec<String> {
        let active = self
            .tasks
            .values()
            .filter(|task| task.is_active())
            .map(|task| task.url.clone())
            .collect();
        self.tasks.clear();
        active
    }

    fn downloading_mut(&mut self, url: &str) -> Result<&mut DownloadTask, QueueError> {
        let task = self.task_mut(url)?;
        if task.status == DownloadStatus::Downloading {
            Ok(task)
        } else {
            Err(QueueError::InvalidTransition {
                url: url.to_string(),
                from: task.status,
                to: DownloadStatus::Downloading,
            })
        }
    }

    fn transition(
        &mut self,
        url: &str,
        next: DownloadStatus,
    ) -> Result<&mut DownloadTask, QueueError> {
        let task = self.task_mut(url)?;
        if !task.status.can_transition_to(next) {
            return Err(QueueError::InvalidTransition {
                url: url.to_string(),
                from: task.status,
                to: next,
            });
        }
        task.status = next;
        if next.is_terminal() {
            task.finished_at = Some(Utc::now());
        }
        Ok(task)
    }

    fn task_mut(&mut self, url: &str) -> Result<&mut DownloadTask, QueueError> {
        self.tasks
            .get_mut(url)
            .ok_or_else(|| QueueError::NotInQueue {
                url: url.to_string(),
            })
    }
}
