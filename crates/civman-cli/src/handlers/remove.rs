//! `civman remove`: drop a catalog entry, optionally with its files.

use anyhow::Result;
use civman_catalog::{CatalogError, delete_model_files, find_model_path};
use tracing::warn;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::display_model_details;
use crate::utils::input;

/// Execute the remove command.
///
/// Without `force` the entry is shown and the user must confirm. With
/// `delete_files` the model folder (model file, gallery and
/// `metadata.json`) is deleted from the destination root as well.
pub fn execute(ctx: &CliContext, id: u64, delete_files: bool, force: bool) -> Result<()> {
    let record = ctx
        .catalog
        .lock()
        .get(id)
        .cloned()
        .ok_or_else(|| CliError::from(CatalogError::NotFound(id)))?;

    if !force {
        display_model_details(&record);
        println!();
        let question = if delete_files {
            "Remove this model from the catalog and delete its files?"
        } else {
            "Remove this model from the catalog?"
        };
        if !input::prompt_confirmation(question)? {
            println!("Remove operation cancelled.");
            return Ok(());
        }
    }

    if delete_files {
        match ctx
            .settings
            .destination_root()
            .and_then(|root| find_model_path(&root, &record))
        {
            Some(path) => {
                delete_model_files(&path).map_err(CliError::from)?;
                println!("Deleted {}", path.display());
            }
            None => {
                warn!(model_id = id, "Model folder not found, removing catalog entry only");
                println!("No files found on disk for this model.");
            }
        }
    }

    let mut store = ctx.catalog.lock();
    store.remove(id);
    store.save().map_err(CliError::from)?;
    println!("Model '{}' (ID {id}) removed from the catalog.", record.name);
    Ok(())
}
