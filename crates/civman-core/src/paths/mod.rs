//! Path utilities for civman data files and the model folder layout.
//!
//! - Config and catalog file locations (per user, relocatable with
//!   `CIVMAN_DATA_DIR`)
//! - Where a downloaded model lands under the destination root

mod error;
mod layout;
mod platform;

pub use error::PathError;
pub use layout::{
    IMAGES_DIR_NAME, METADATA_FILE_NAME, base_model_dir_name, model_folder, sanitize_name,
};
pub use platform::{
    CATALOG_FILE_NAME, CONFIG_FILE_NAME, DATA_DIR_ENV, catalog_path, config_path, data_root,
    ensure_directory,
};
