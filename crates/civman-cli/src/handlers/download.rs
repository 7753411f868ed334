//! `civman download`: queue model URLs and drain the queue.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use civman_core::{DownloadStatus, DownloadTask, ensure_directory, extract_model_urls};
use civman_download::{DownloadManagerConfig, DownloadManagerDeps, build_download_manager};
use tracing::{info, warn};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::QueueProgressRenderer;

/// Arguments of the download command.
pub struct DownloadArgs {
    pub urls: Vec<String>,
    pub from_file: Option<PathBuf>,
    pub max_images: Option<usize>,
    pub root: Option<PathBuf>,
}

/// Positional URLs followed by every model link found in `file_text`,
/// trimmed, with duplicates removed.
pub fn collect_urls(urls: &[String], file_text: Option<&str>) -> Vec<String> {
    let from_file = file_text.map(extract_model_urls).unwrap_or_default();
    let mut seen = HashSet::new();
    urls.iter()
        .map(|url| url.trim().to_string())
        .chain(from_file)
        .filter(|url| !url.is_empty() && seen.insert(url.clone()))
        .collect()
}

/// Counts per terminal status.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub completed: usize,
    pub failed: usize,
    pub canceled: usize,
}

impl Summary {
    pub fn of(tasks: &[DownloadTask]) -> Self {
        tasks.iter().fold(Self::default(), |mut summary, task| {
            match task.status {
                DownloadStatus::Completed => summary.completed += 1,
                DownloadStatus::Failed => summary.failed += 1,
                DownloadStatus::Canceled => summary.canceled += 1,
                DownloadStatus::Queued | DownloadStatus::Downloading => {}
            }
            summary
        })
    }
}

fn manager_config(
    ctx: &CliContext,
    args: &DownloadArgs,
) -> Result<DownloadManagerConfig, CliError> {
    let config = match &args.root {
        Some(root) => DownloadManagerConfig::new(root.clone())
            .with_max_images(ctx.settings.effective_top_image_count())
            .with_cooldown(ctx.settings.effective_download_cooldown()),
        None => ctx.download_config()?,
    };
    Ok(match args.max_images {
        Some(max) => config.with_max_images(max),
        None => config,
    })
}

/// Execute the download command.
///
/// Ctrl-C cancels the running task, clears the queue and flushes the
/// catalog before returning [`CliError::Interrupted`].
pub async fn execute(ctx: &CliContext, args: DownloadArgs) -> Result<()> {
    let file_text = match &args.from_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?,
        ),
        None => None,
    };
    let urls = collect_urls(&args.urls, file_text.as_deref());
    if urls.is_empty() {
        return Err(CliError::Arguments("No model URLs given".to_string()).into());
    }

    let config = manager_config(ctx, &args)?;
    ensure_directory(&config.destination_root).map_err(CliError::from)?;
    println!(
        "Downloading {} model(s) into {}",
        urls.len(),
        config.destination_root.display()
    );

    let renderer = Arc::new(QueueProgressRenderer::new());
    let manager = build_download_manager(DownloadManagerDeps {
        client: Arc::clone(&ctx.client),
        registrar: Arc::new(ctx.catalog.clone()),
        emitter: renderer.clone(),
        config,
    });
    manager.enqueue(&urls).await;

    let run = manager.run_until_idle();
    tokio::pin!(run);
    let interrupted = tokio::select! {
        _ = &mut run => false,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            true
        }
    };

    if interrupted {
        warn!(target: "civman.download", "Interrupted, canceling downloads");
        let dropped = manager.clear().await;
        run.await;
        renderer.finish();
        ctx.catalog.flush().map_err(CliError::from)?;
        println!("Interrupted: {dropped} download(s) canceled.");
        return Err(CliError::Interrupted.into());
    }

    renderer.finish();
    ctx.catalog.flush().map_err(CliError::from)?;

    let summary = Summary::of(&manager.tasks().await);
    info!(
        target: "civman.download",
        completed = summary.completed,
        failed = summary.failed,
        canceled = summary.canceled,
        "Download run finished"
    );
    println!(
        "Done: {} completed, {} failed, {} canceled.",
        summary.completed, summary.failed, summary.canceled
    );
    if summary.failed > 0 {
        return Err(CliError::Download(format!("{} download(s) failed", summary.failed)).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_urls_merges_and_dedups() {
        let args = vec![
            " https://civitai.com/models/1 ".to_string(),
            String::new(),
            "https://civitai.com/models/2".to_string(),
        ];
        let text =
            "see https://civitai.com/models/2 and https://civitai.com/models/3?modelVersionId=9";
        let urls = collect_urls(&args, Some(text));
        assert_eq!(
            urls,
            vec![
                "https://civitai.com/models/1",
                "https://civitai.com/models/2",
                "https://civitai.com/models/3?modelVersionId=9",
            ]
        );
    }

    #[test]
    fn test_collect_urls_without_file() {
        assert!(collect_urls(&[], None).is_empty());
    }

    #[test]
    fn test_summary_counts_terminal_states() {
        let task = |status| DownloadTask {
            status,
            ..DownloadTask::new("u")
        };
        let summary = Summary::of(&[
            task(DownloadStatus::Completed),
            task(DownloadStatus::Completed),
            task(DownloadStatus::Failed),
            task(DownloadStatus::Canceled),
            task(DownloadStatus::Queued),
        ]);
        assert_eq!(
            summary,
            Summary {
                completed: 2,
                failed: 1,
                canceled: 1
            }
        );
    }
}
