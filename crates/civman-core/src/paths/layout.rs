//! Folder layout under the destination root.
//!
//! `root/<category folder>/<base model>/<sanitized name>/` holds the model
//! file, a `metadata.json` and an `images/` directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::ModelCategory;

/// Per-model metadata file name.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Per-model gallery directory name.
pub const IMAGES_DIR_NAME: &str = "images";

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid regex"));

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    UNSAFE_NAME_CHARS.replace_all(name, "_").into_owned()
}

/// Directory name for a base-model label.
///
/// Labels such as `SD 1.5` are kept readable; only path separators and
/// relative components are neutralised.
#[must_use]
pub fn base_model_dir_name(base_model: &str) -> String {
    let cleaned: String = base_model
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "unknown".to_string(),
        _ => cleaned,
    }
}

/// Folder a model is downloaded into.
#[must_use]
pub fn model_folder(root: &Path, category: ModelCategory, base_model: &str, name: &str) -> PathBuf {
    root.join(category.folder())
        .join(base_model_dir_name(base_model))
        .join(sanitize_name(name))
}
