//! Download domain types, events, and errors.
//!
//! Pure data types for the download queue and orchestrator. No I/O,
//! networking, or runtime dependencies allowed.
//!
//! - `types` - task records, status and orchestration stage
//! - `events` - notifications published by the queue (`QueueEvent`)
//! - `errors` - error taxonomy for a single download task

pub mod errors;
pub mod events;
pub mod types;

pub use errors::{DownloadError, DownloadResult};
pub use events::QueueEvent;
pub use types::{DownloadStatus, DownloadTask, TaskStage};
