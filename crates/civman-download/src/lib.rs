#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Re-export core types for convenience
pub use civman_core::{
    AssetRegistrarPort, DownloadError, DownloadResult, DownloadStatus, DownloadTask, QueueEvent,
    QueueEventEmitterPort, TaskStage,
};

pub(crate) mod progress;
pub mod queue;

pub use progress::ProgressThrottle;
pub use queue::{DownloadQueue, QueueError};

mod manager;

pub use manager::{
    DownloadManager, DownloadManagerConfig, DownloadManagerDeps, ModelDestination, TaskJob,
    TaskProgress, WorkerDeps, build_download_manager,
};

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use async_trait as _;
