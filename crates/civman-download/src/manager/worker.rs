//! Per-URL download pipeline.
//!
//! The worker operates on a [`TaskJob`] value and cloned dependencies, with
//! no access to the manager's queue. It reports stage and progress through
//! the job's `watch::Sender` only; the manager's bridge turns those into
//! queue updates and events.
//!
//! Every network step races the job's cancellation token, so a cancel takes
//! effect at the next await point. Dropping an in-flight transfer removes
//! its partial file.

use std::future::Future;
use std::sync::Arc;

use civman_core::{
    AssetRecord, CivitaiClientPort, DownloadError, DownloadResult, FileFetch, ProgressFn,
    TaskStage, timestamp_now,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::LOG_TARGET;
use super::config::DownloadManagerConfig;
use super::paths::ModelDestination;

/// Dependencies of the worker, cloned from the manager.
#[derive(Clone)]
pub struct WorkerDeps {
    pub client: Arc<dyn CivitaiClientPort>,
    pub config: DownloadManagerConfig,
}

/// One task to run.
pub struct TaskJob {
    pub url: String,
    pub cancel: CancellationToken,
    pub progress_tx: watch::Sender<TaskProgress>,
}

/// Stage and progress as last reported by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskProgress {
    pub stage: TaskStage,
    /// Model file percentage, once the transfer started.
    pub model: Option<u8>,
    /// Gallery percentage, once image downloads started.
    pub images: Option<u8>,
    /// Bumped on every report.
    pub seq: u64,
}

impl Default for TaskProgress {
    fn default() -> Self {
        Self {
            stage: TaskStage::Resolving,
            model: None,
            images: None,
            seq: 0,
        }
    }
}

fn report(tx: &watch::Sender<TaskProgress>, update: impl FnOnce(&mut TaskProgress)) {
    tx.send_modify(|state| {
        update(state);
        state.seq += 1;
    });
}

fn enter_stage(tx: &watch::Sender<TaskProgress>, url: &str, stage: TaskStage) {
    debug!(target: LOG_TARGET, url, stage = stage.label(), "Entering stage");
    report(tx, |state| state.stage = stage);
}

/// Run `fut` unless the job is canceled first.
async fn guarded<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = DownloadResult<T>>,
) -> DownloadResult<T> {
    tokio::select! {
        biased;

        () = cancel.cancelled() => Err(DownloadError::Cancelled),

        result = fut => result,
    }
}

fn check_cancel(cancel: &CancellationToken) -> DownloadResult<()> {
    if cancel.is_cancelled() {
        Err(DownloadError::Cancelled)
    } else {
        Ok(())
    }
}

/// Run a task to completion.
///
/// Returns the hydrated asset: gallery with local paths, thumbnail, size
/// and download date. Registration is left to the manager.
pub async fn run_job(job: TaskJob, deps: &WorkerDeps) -> DownloadResult<AssetRecord> {
    let TaskJob {
        url,
        cancel,
        progress_tx,
    } = job;
    let client = deps.client.as_ref();

    // Resolve
    enter_stage(&progress_tx, &url, TaskStage::Resolving);
    let resolved = client.resolve_url(&url);
    let Some(model_id) = resolved.model_id else {
        return Err(DownloadError::invalid_url(&url));
    };
    check_cancel(&cancel)?;

    // Metadata
    enter_stage(&progress_tx, &url, TaskStage::FetchingMetadata);
    let mut asset = guarded(&cancel, async {
        client
            .fetch_metadata(model_id, resolved.version_id)
            .await
            .map_err(DownloadError::from)
    })
    .await?;
    info!(
        target: LOG_TARGET,
        url,
        model_id = asset.id,
        version_id = asset.version_id,
        name = %asset.name,
        "Fetched model metadata"
    );

    // Gallery listing
    enter_stage(&progress_tx, &url, TaskStage::FetchingImages);
    let version_id = asset.version_id;
    let max_images = deps.config.max_images;
    asset.images = if max_images == 0 {
        Vec::new()
    } else {
        guarded(&cancel, async {
            Ok(client
                .fetch_images(model_id, Some(version_id), max_images)
                .await)
        })
        .await?
    };
    debug!(target: LOG_TARGET, url, count = asset.images.len(), "Gallery ranked");

    // Model file
    enter_stage(&progress_tx, &url, TaskStage::DownloadingFile);
    if asset.download_url.is_empty() {
        return Err(DownloadError::not_found(format!(
            "No download URL for {}",
            asset.name
        )));
    }
    let destination = ModelDestination::plan(&deps.config.destination_root, &asset);
    destination.ensure_dir().await?;

    report(&progress_tx, |state| state.model = Some(0));
    let model_tx = progress_tx.clone();
    let on_progress: Box<ProgressFn> = Box::new(move |percent: u8| {
        report(&model_tx, |state| state.model = Some(percent));
    });
    let fetched = guarded(&cancel, async {
        client
            .download_file(
                &asset.download_url,
                &destination.folder,
                Some(on_progress.as_ref()),
            )
            .await
            .map_err(DownloadError::from)
    })
    .await?;
    report(&progress_tx, |state| state.model = Some(100));
    let mut total_bytes = file_bytes(&fetched).await;
    info!(
        target: LOG_TARGET,
        url,
        path = %fetched.path().display(),
        bytes = total_bytes,
        "Model file ready"
    );

    // Gallery files
    enter_stage(&progress_tx, &url, TaskStage::DownloadingImages);
    report(&progress_tx, |state| state.images = Some(0));
    if !asset.images.is_empty() {
        destination.ensure_images_dir().await?;
    }
    let images_dir = destination.images_dir();
    let count = asset.images.len();
    for index in 0..count {
        check_cancel(&cancel)?;
        let image_url = asset.images[index].url.clone();
        if !image_url.is_empty() {
            let result = guarded(&cancel, async {
                client
                    .download_file(&image_url, &images_dir, None)
                    .await
                    .map_err(DownloadError::from)
            })
            .await;
            match result {
                Ok(fetched) => {
                    total_bytes += file_bytes(&fetched).await;
                    let local = fetched.path().to_string_lossy().into_owned();
                    if asset.thumbnail.is_empty() {
                        asset.thumbnail.clone_from(&local);
                    }
                    asset.images[index].local_path = Some(local);
                }
                Err(DownloadError::Cancelled) => return Err(DownloadError::Cancelled),
                Err(e) => warn!(
                    target: LOG_TARGET,
                    url,
                    image = %image_url,
                    error = %e,
                    "Image download failed"
                ),
            }
        }
        report(&progress_tx, |state| {
            state.images = Some(percent(index + 1, count));
        });
    }
    report(&progress_tx, |state| state.images = Some(100));

    // Persist next to the files
    asset.mark_downloaded(total_bytes, timestamp_now());
    destination.write_metadata(&asset).await?;
    info!(target: LOG_TARGET, url, folder = %destination.folder.display(), "Download finished");

    Ok(asset)
}

async fn file_bytes(fetched: &FileFetch) -> u64 {
    match fetched {
        FileFetch::Downloaded { bytes, .. } => *bytes,
        FileFetch::AlreadyPresent { path } => tokio::fs::metadata(path)
            .await
            .map(|meta| meta.len())
            .unwrap_or(0),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}
