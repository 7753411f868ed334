//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the download orchestrator expects from
//! infrastructure. Implementations live in adapter crates (`civman-civitai`
//! for the platform client, `civman-catalog` for the registrar,
//! `civman-download` for channel-backed emitters).

pub mod asset_registrar;
pub mod civitai;
pub mod queue_event_emitter;

pub use asset_registrar::{AssetRegistrarPort, RegistrarError};
pub use civitai::{
    CivitaiClientPort, CivitaiPortError, CivitaiPortResult, FileFetch, ModelSummary, ProgressFn,
    ResolvedUrl, SearchOptions,
};
pub use queue_event_emitter::{NoopQueueEmitter, QueueEventEmitterPort};
