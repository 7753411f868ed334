//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `execute(ctx: &CliContext, ...) -> Result<()>`, async only
//!   when the command talks to the network
//! - Validate CLI-specific input, call the adapters, format output
//!
//! Errors are returned as [`CliError`](crate::CliError) wrapped in anyhow so
//! `main` can pick the exit code.

pub mod catalog;
pub mod config;
pub mod download;
pub mod info;
pub mod list;
pub mod paths;
pub mod remove;
pub mod search;
pub mod storage;
pub mod transfer;
