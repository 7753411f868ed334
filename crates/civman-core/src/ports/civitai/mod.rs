//! Civitai client port definitions.
//!
//! This module defines the port trait and DTOs for talking to the model
//! platform. The implementation lives in `civman-civitai`.

mod client;
mod error;
mod types;

pub use client::{CivitaiClientPort, ProgressFn};
pub use error::{CivitaiPortError, CivitaiPortResult};
pub use types::{FileFetch, ModelSummary, ResolvedUrl, SearchOptions};
