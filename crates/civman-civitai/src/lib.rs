#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// CivitaiClient<B> is meant to be used through DefaultCivitaiClient and the
// CivitaiClientPort trait, not its generic backend parameter
#![allow(private_interfaces)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod parsing;
mod port;
mod rate_limit;
mod resolver;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::DefaultCivitaiClient;

// Configuration
pub use config::CivitaiClientConfig;

// Errors
pub use error::CivitaiError;

// URL resolution is pure and usable without a client
pub use resolver::resolve_model_url;

// Silence unused dev-dependency warnings
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
