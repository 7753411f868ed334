//! `civman paths`: show every location civman reads or writes.

use anyhow::Result;
use civman_core::{Settings, data_root};

use crate::bootstrap::CliConfig;
use crate::error::CliError;

/// Execute the paths command.
pub fn execute(config: &CliConfig, settings: &Settings) -> Result<()> {
    let root = data_root().map_err(CliError::from)?;
    println!("data_dir     = {}", root.display());
    println!("config_file  = {}", config.config_path.display());
    println!("catalog_file = {}", config.catalog_path.display());
    match settings.destination_root() {
        Some(dest) => println!("destination  = {}", dest.display()),
        None => println!("destination  = (not set)"),
    }
    Ok(())
}
