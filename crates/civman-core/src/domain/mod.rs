//! Domain types for downloaded model assets.
//!
//! These types are pure data structures with no infrastructure dependencies.
//! They describe what the catalog persists and what the Civitai client
//! produces after a successful fetch.

mod asset;
mod category;

pub use asset::{AssetRecord, ImageRecord, ImageStats, UNKNOWN_BASE_MODEL, UNKNOWN_CREATOR};
pub use category::{ModelCategory, StorageGroup};
