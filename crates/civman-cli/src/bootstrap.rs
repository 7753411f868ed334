//! CLI bootstrap, the composition root.
//!
//! Concrete adapters are only instantiated here:
//! - Settings from the JSON config file (via civman-core)
//! - The local catalog (via civman-catalog)
//! - The Civitai client (via civman-civitai)
//!
//! The download manager is built per `download` invocation from these
//! pieces, see [`CliContext::download_config`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use civman_catalog::{CatalogStore, SharedCatalog};
use civman_civitai::{CivitaiClientConfig, DefaultCivitaiClient};
use civman_core::{CivitaiClientPort, ConfigStore, Settings, catalog_path, config_path};
use civman_download::DownloadManagerConfig;
use tracing::debug;

use crate::error::CliError;

/// File locations used by the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// JSON settings file.
    pub config_path: PathBuf,
    /// JSON catalog file.
    pub catalog_path: PathBuf,
}

impl CliConfig {
    /// Resolve the default locations (honours `CIVMAN_DATA_DIR`).
    pub fn with_defaults() -> Result<Self, CliError> {
        Ok(Self {
            config_path: config_path()?,
            catalog_path: catalog_path()?,
        })
    }

    /// Load the settings document.
    pub fn load_store(&self) -> Result<ConfigStore, CliError> {
        Ok(ConfigStore::load(&self.config_path)?)
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Settings document, for `config` subcommands.
    pub config: ConfigStore,
    /// Typed settings with environment overrides applied.
    pub settings: Settings,
    /// The local catalog.
    pub catalog: SharedCatalog,
    /// Civitai API client.
    pub client: Arc<dyn CivitaiClientPort>,
}

impl CliContext {
    /// Destination root, or a configuration error telling the user how to
    /// set one.
    pub fn destination_root(&self) -> Result<PathBuf, CliError> {
        self.settings.destination_root().ok_or_else(|| {
            CliError::Config(
                "Destination folder is not set. Run `civman config set comfy_path <dir>` first."
                    .to_string(),
            )
        })
    }

    /// Manager configuration derived from the settings.
    pub fn download_config(&self) -> Result<DownloadManagerConfig, CliError> {
        Ok(DownloadManagerConfig::from_settings(&self.settings)?)
    }
}

/// Bootstrap the CLI application.
///
/// Opens the catalog (a corrupt file is an error, never silently replaced)
/// and builds the HTTP client from the effective settings.
pub fn bootstrap(config: &CliConfig, store: ConfigStore) -> Result<CliContext> {
    let mut settings = store.settings();
    settings.apply_env_overrides();

    let catalog = CatalogStore::open(&config.catalog_path).map_err(CliError::from)?;
    debug!(
        path = %config.catalog_path.display(),
        models = catalog.len(),
        "Catalog opened"
    );

    let client = DefaultCivitaiClient::new(CivitaiClientConfig::from_settings(&settings))
        .map_err(CliError::from)?;

    Ok(CliContext {
        config: store,
        settings,
        catalog: SharedCatalog::new(catalog),
        client: Arc::new(client),
    })
}
