//! JSON configuration document.
//!
//! [`ConfigStore`] treats the file as an opaque key-value map: keys it does
//! not know about (window geometry, UI state) are loaded and written back
//! untouched. [`Settings`] is the typed view over the same document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::settings::{Settings, SettingsError, validate_settings};

/// Errors from reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("Failed to access config file {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// The document could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    /// A value was rejected by settings validation.
    #[error(transparent)]
    Invalid(#[from] SettingsError),
}

/// Key-value configuration backed by a JSON file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    document: Map<String, Value>,
}

impl ConfigStore {
    /// Load the document at `path`.
    ///
    /// A missing file yields an empty document. A corrupt file is logged and
    /// also treated as empty so the application can still start.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let document = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    warn!(path = %path.display(), "Config file is not a JSON object, ignoring it");
                    Map::new()
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Config file is not valid JSON, ignoring it");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file yet, using defaults");
                Map::new()
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path,
                    reason: e.to_string(),
                });
            }
        };

        Ok(Self { path, document })
    }

    /// In-memory store that is never read from disk.
    #[must_use]
    pub fn in_memory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: Map::new(),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw document.
    #[must_use]
    pub const fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Typed settings view, defaults applied per key.
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings::from_document(&self.document)
    }

    /// Raw value for `key`.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    /// Value for `key`, or `default` when missing or of the wrong type.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.document
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(default)
    }

    /// Set `key` to `value`, rejecting values that fail settings validation.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        let previous = self.document.insert(key.to_string(), value);
        if let Err(e) = validate_settings(&self.settings()) {
            match previous {
                Some(old) => self.document.insert(key.to_string(), old),
                None => self.document.remove(key),
            };
            return Err(e.into());
        }
        Ok(())
    }

    /// Set `key` from command-line text.
    ///
    /// The text is parsed as JSON when possible (`0.5`, `true`, `12`) and
    /// stored as a string otherwise.
    pub fn set_from_str(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let value = serde_json::from_str::<Value>(raw)
            .ok()
            .filter(|v| !v.is_object() && !v.is_array())
            .unwrap_or_else(|| Value::String(raw.to_string()));
        self.set(key, value)
    }

    /// Merge several keys at once.
    pub fn update(&mut self, values: Map<String, Value>) -> Result<(), ConfigError> {
        let snapshot = self.document.clone();
        self.document.extend(values);
        if let Err(e) = validate_settings(&self.settings()) {
            self.document = snapshot;
            return Err(e.into());
        }
        Ok(())
    }

    /// Write the document back to disk (pretty-printed).
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        let content = serde_json::to_string_pretty(&self.document)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| ConfigError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}
