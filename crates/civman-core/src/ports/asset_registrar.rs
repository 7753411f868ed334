//! Asset registrar port.
//!
//! The orchestrator hands every successfully downloaded asset to this port.
//! The catalog crate implements it; tests use an in-memory recorder.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AssetRecord;

/// Error returned when an asset cannot be recorded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RegistrarError {
    /// What went wrong.
    pub message: String,
}

impl RegistrarError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Port for persisting downloaded assets.
///
/// Registration is an idempotent upsert keyed by the asset id.
#[async_trait]
pub trait AssetRegistrarPort: Send + Sync {
    /// Upsert the asset and persist it.
    async fn register_asset(&self, asset: &AssetRecord) -> Result<(), RegistrarError>;
}
