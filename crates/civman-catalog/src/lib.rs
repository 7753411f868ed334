#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod error;
mod registrar;
pub mod storage;
pub mod store;

pub use error::{CatalogError, CatalogResult};
pub use storage::{
    StorageReport, delete_model_files, find_model_path, folder_size, scan_metadata,
    storage_usage,
};
pub use registrar::SharedCatalog;
pub use store::{CatalogStore, Upsert, read_export};

#[cfg(test)]
use tempfile as _;
