//! Download manager.
//!
//! Owns the queue and drains it one URL at a time.
//!
//! # Architecture
//!
//! - **Manager**: queue mutations, cancellation tokens, event emission
//! - **Worker**: runs the pipeline for one URL, writes only to a `watch::Sender`
//! - **Bridge**: follows the watch channel and applies stage and throttled
//!   progress to the queue
//!
//! # Concurrency model
//!
//! - At most one drain runs at a time (`drain_lock`), so at most one task
//!   is downloading
//! - `Notify` wakes the long-lived runner when work arrives
//! - Lock order: queue → active

mod config;
mod paths;
mod worker;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use civman_core::{
    AssetRecord, AssetRegistrarPort, CivitaiClientPort, DownloadError, DownloadResult,
    DownloadTask, QueueEvent, QueueEventEmitterPort, TaskStage,
};
use tokio::sync::{Mutex, Notify, RwLock, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::progress::ProgressThrottle;
use crate::queue::{DownloadQueue, QueueError};

pub use config::DownloadManagerConfig;
pub use paths::ModelDestination;
pub use worker::{TaskJob, TaskProgress, WorkerDeps};

/// Tracing target of queue lifecycle events.
const LOG_TARGET: &str = "civman.download";

/// Everything the manager needs from the outside.
pub struct DownloadManagerDeps {
    pub client: Arc<dyn CivitaiClientPort>,
    pub registrar: Arc<dyn AssetRegistrarPort>,
    pub emitter: Arc<dyn QueueEventEmitterPort>,
    pub config: DownloadManagerConfig,
}

/// Build a shareable manager.
pub fn build_download_manager(deps: DownloadManagerDeps) -> Arc<DownloadManager> {
    Arc::new(DownloadManager::new(deps))
}

/// Sequential download queue with cancellation.
pub struct DownloadManager {
    client: Arc<dyn CivitaiClientPort>,
    registrar: Arc<dyn AssetRegistrarPort>,
    emitter: Arc<dyn QueueEventEmitterPort>,
    config: DownloadManagerConfig,
    queue: RwLock<DownloadQueue>,
    /// Cancellation token of the task being processed, by URL.
    active: Mutex<HashMap<String, CancellationToken>>,
    drain_lock: Mutex<()>,
    queue_notify: Notify,
    runner_started: AtomicBool,
}

impl DownloadManager {
    pub fn new(deps: DownloadManagerDeps) -> Self {
        Self {
            client: deps.client,
            registrar: deps.registrar,
            emitter: deps.emitter,
            config: deps.config,
            queue: RwLock::new(DownloadQueue::new()),
            active: Mutex::new(HashMap::new()),
            drain_lock: Mutex::new(()),
            queue_notify: Notify::new(),
            runner_started: AtomicBool::new(false),
        }
    }

    pub const fn config(&self) -> &DownloadManagerConfig {
        &self.config
    }

    // ========================================================================
    // Queue operations
    // ========================================================================

    /// Queue every URL not already present. Returns how many were added.
    pub async fn enqueue<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (added, tasks, counts) = {
            let mut queue = self.queue.write().await;
            let added = queue.enqueue(urls);
            let tasks: Vec<DownloadTask> = added
                .iter()
                .filter_map(|url| queue.get(url).cloned())
                .collect();
            (added, tasks, (queue.active_count(), queue.len()))
        };

        if added.is_empty() {
            debug!(target: LOG_TARGET, "Nothing new to queue");
            return 0;
        }
        info!(target: LOG_TARGET, count = added.len(), "Queued downloads");
        for task in tasks {
            self.emitter.emit(QueueEvent::task_changed(task));
        }
        self.emitter.emit(QueueEvent::queue_changed(counts.0, counts.1));
        self.queue_notify.notify_one();
        added.len()
    }

    /// Cancel a queued or downloading task.
    ///
    /// A running transfer stops at its next await point and leaves no partial
    /// file behind.
    pub async fn cancel(&self, url: &str) -> DownloadResult<()> {
        let (task, counts) = {
            let mut queue = self.queue.write().await;
            let task = queue.cancel(url).cloned().map_err(|e| {
                warn!(target: LOG_TARGET, url, error = %e, "Cannot cancel");
                DownloadError::from(e)
            })?;
            if let Some(token) = self.active.lock().await.get(url) {
                token.cancel();
            }
            (task, (queue.active_count(), queue.len()))
        };

        warn!(target: LOG_TARGET, url, "Download canceled");
        self.emitter.emit(QueueEvent::task_changed(task));
        self.emitter.emit(QueueEvent::queue_changed(counts.0, counts.1));
        Ok(())
    }

    /// Cancel everything and empty the queue. Returns how many tasks were
    /// still queued or downloading.
    pub async fn clear(&self) -> usize {
        let canceled = {
            let mut queue = self.queue.write().await;
            let canceled = queue.clear();
            for token in self.active.lock().await.values() {
                token.cancel();
            }
            canceled
        };

        if !canceled.is_empty() {
            warn!(target: LOG_TARGET, count = canceled.len(), "Canceled pending downloads");
        }
        self.emitter.emit(QueueEvent::queue_changed(0, 0));
        canceled.len()
    }

    pub async fn tasks(&self) -> Vec<DownloadTask> {
        self.queue.read().await.all_tasks()
    }

    pub async fn task(&self, url: &str) -> Option<DownloadTask> {
        self.queue.read().await.get(url).cloned()
    }

    /// Queued plus downloading tasks.
    pub async fn active_count(&self) -> usize {
        self.queue.read().await.active_count()
    }

    /// True when nothing is queued or downloading.
    pub async fn is_idle(&self) -> bool {
        self.queue.read().await.is_empty()
    }

    // ========================================================================
    // Processing
    // ========================================================================

    /// Start the background runner once. Later calls do nothing.
    pub fn ensure_runner(self: &Arc<Self>) {
        if self
            .runner_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let manager = Arc::clone(self);
            tokio::spawn(async move {
                manager.run_loop().await;
            });
        }
    }

    async fn run_loop(&self) {
        loop {
            self.run_until_idle().await;
            self.queue_notify.notified().await;
        }
    }

    /// Process queued tasks one by one until none is left.
    ///
    /// Waits for the configured cooldown between two tasks. Returns the
    /// number of tasks processed.
    pub async fn run_until_idle(&self) -> usize {
        let _drain = self.drain_lock.lock().await;
        let mut processed = 0;

        while let Some((url, cancel)) = self.next_job().await {
            self.process(&url, cancel).await;
            processed += 1;

            let more = self.queue.read().await.next_url().is_some();
            if more && !self.config.cooldown.is_zero() {
                debug!(
                    target: LOG_TARGET,
                    cooldown = ?self.config.cooldown,
                    "Waiting before next download"
                );
                tokio::time::sleep(self.config.cooldown).await;
            }
        }
        processed
    }

    /// Move the oldest queued task to `Downloading` and arm its token.
    async fn next_job(&self) -> Option<(String, CancellationToken)> {
        let (task, cancel) = {
            let mut queue = self.queue.write().await;
            let url = queue.next_url()?.to_string();
            let task = match queue.start(&url) {
                Ok(task) => task.clone(),
                Err(e) => {
                    warn!(target: LOG_TARGET, url, error = %e, "Cannot start download");
                    return None;
                }
            };
            let cancel = CancellationToken::new();
            self.active.lock().await.insert(url, cancel.clone());
            (task, cancel)
        };

        info!(target: LOG_TARGET, url = %task.url, "Starting download");
        let url = task.url.clone();
        self.emitter.emit(QueueEvent::stage_changed(&url, TaskStage::Resolving));
        self.emitter.emit(QueueEvent::task_changed(task));
        Some((url, cancel))
    }

    async fn process(&self, url: &str, cancel: CancellationToken) {
        let (progress_tx, progress_rx) = watch::channel(TaskProgress::default());
        let job = TaskJob {
            url: url.to_string(),
            cancel: cancel.clone(),
            progress_tx,
        };
        let deps = WorkerDeps {
            client: Arc::clone(&self.client),
            config: self.config.clone(),
        };

        // The worker owns the only sender, so the bridge ends with it.
        let (result, ()) = tokio::join!(
            worker::run_job(job, &deps),
            self.forward_progress(url, progress_rx)
        );

        self.finalize(url, &cancel, result).await;
        self.active.lock().await.remove(url);
    }

    async fn finalize(
        &self,
        url: &str,
        cancel: &CancellationToken,
        result: DownloadResult<AssetRecord>,
    ) {
        match result {
            Ok(_) if cancel.is_cancelled() => {
                warn!(target: LOG_TARGET, url, "Download finished after cancel, not registering");
                self.mark_canceled(url).await;
            }
            Ok(asset) => match self.registrar.register_asset(&asset).await {
                Ok(()) => {
                    info!(
                        target: LOG_TARGET,
                        url,
                        model_id = asset.id,
                        name = %asset.name,
                        "Download completed"
                    );
                    let message = format!("Downloaded {}", asset.name);
                    self.finish(url, true, Some(message), Some(&asset)).await;
                }
                Err(e) => {
                    error!(
                        target: LOG_TARGET,
                        url,
                        error = %e,
                        "Cannot record download in catalog"
                    );
                    let message = DownloadError::catalog(e.message).user_message();
                    self.finish(url, false, Some(message), Some(&asset)).await;
                }
            },
            Err(DownloadError::Cancelled) => self.mark_canceled(url).await,
            Err(e) => {
                error!(target: LOG_TARGET, url, error = %e, "Download failed");
                self.finish(url, false, Some(e.user_message()), None).await;
            }
        }
    }

    async fn finish(
        &self,
        url: &str,
        success: bool,
        message: Option<String>,
        asset: Option<&AssetRecord>,
    ) {
        let outcome = {
            let mut queue = self.queue.write().await;
            queue
                .complete(url, success, message, asset)
                .cloned()
                .map(|task| (task, queue.active_count(), queue.len()))
        };
        match outcome {
            Ok((task, active, total)) => {
                self.emitter.emit(QueueEvent::task_changed(task));
                self.emitter.emit(QueueEvent::queue_changed(active, total));
            }
            Err(e) => {
                debug!(
                    target: LOG_TARGET,
                    url,
                    error = %e,
                    "Task already finished, cleared or queued again"
                );
            }
        }
    }

    async fn mark_canceled(&self, url: &str) {
        let outcome = {
            let mut queue = self.queue.write().await;
            queue
                .abort(url)
                .cloned()
                .map(|task| (task, queue.active_count(), queue.len()))
        };
        match outcome {
            Ok((task, active, total)) => {
                self.emitter.emit(QueueEvent::task_changed(task));
                self.emitter.emit(QueueEvent::queue_changed(active, total));
            }
            // Canceled through `cancel` or `clear`, which already reported it,
            // or cleared and queued again under the same URL.
            Err(QueueError::InvalidTransition { .. } | QueueError::NotInQueue { .. }) => {}
            Err(e) => debug!(target: LOG_TARGET, url, error = %e, "Cannot mark canceled"),
        }
    }

    // ========================================================================
    // Progress bridge
    // ========================================================================

    /// Apply worker reports to the queue until the worker drops its sender.
    async fn forward_progress(&self, url: &str, mut rx: watch::Receiver<TaskProgress>) {
        let mut model_throttle = ProgressThrottle::new(self.config.progress_interval);
        let mut image_throttle = ProgressThrottle::new(self.config.progress_interval);
        let mut applied = TaskProgress::default();

        while rx.changed().await.is_ok() {
            let current = *rx.borrow_and_update();
            if current.stage != applied.stage {
                self.apply_stage(url, current.stage).await;
                applied.stage = current.stage;
            }

            let model = current
                .model
                .filter(|p| applied.model != Some(*p) && model_throttle.should_emit(*p));
            let images = current
                .images
                .filter(|p| applied.images != Some(*p) && image_throttle.should_emit(*p));
            if model.is_some() || images.is_some() {
                self.apply_progress(url, model, images).await;
                applied.model = model.or(applied.model);
                applied.images = images.or(applied.images);
            }
        }

        // Whatever the throttle held back last.
        let last = *rx.borrow();
        if last.stage != applied.stage {
            self.apply_stage(url, last.stage).await;
        }
        let model = last.model.filter(|p| applied.model != Some(*p));
        let images = last.images.filter(|p| applied.images != Some(*p));
        if model.is_some() || images.is_some() {
            self.apply_progress(url, model, images).await;
        }
    }

    async fn apply_stage(&self, url: &str, stage: TaskStage) {
        let task = self
            .queue
            .write()
            .await
            .set_stage(url, stage)
            .cloned();
        if let Ok(task) = task {
            self.emitter.emit(QueueEvent::stage_changed(url, stage));
            self.emitter.emit(QueueEvent::task_changed(task));
        }
    }

    async fn apply_progress(&self, url: &str, model: Option<u8>, images: Option<u8>) {
        let task = self
            .queue
            .write()
            .await
            .update_progress(url, model, images)
            .cloned();
        if let Ok(task) = task {
            self.emitter.emit(QueueEvent::task_changed(task));
        }
    }
}
