//! `civman export` and `civman import`.

use std::path::Path;

use anyhow::Result;
use civman_catalog::read_export;
use serde_json::Value;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::utils::input;

/// Write the whole catalog to `path`.
pub fn export(ctx: &CliContext, path: &Path) -> Result<()> {
    let store = ctx.catalog.lock();
    store.export(path).map_err(CliError::from)?;
    println!("Exported {} model(s) to {}", store.len(), path.display());
    Ok(())
}

/// Merge an exported catalog. Entries with an id already in the catalog
/// replace the local entry.
pub fn import(ctx: &CliContext, path: &Path, yes: bool) -> Result<()> {
    let document = read_export(path).map_err(CliError::from)?;
    let Value::Object(entries) = &document else {
        return Err(CliError::Arguments(format!(
            "{} is not an exported catalog",
            path.display()
        ))
        .into());
    };

    let replaced = {
        let store = ctx.catalog.lock();
        entries
            .keys()
            .filter_map(|key| key.trim().parse::<u64>().ok())
            .filter(|id| store.contains(*id))
            .count()
    };

    if !yes {
        println!(
            "{} entries in {} ({replaced} would replace existing entries).",
            entries.len(),
            path.display()
        );
        if !input::prompt_confirmation("Import them into the catalog?")? {
            println!("Import cancelled.");
            return Ok(());
        }
    }

    let mut store = ctx.catalog.lock();
    let imported = store.import_document(document).map_err(CliError::from)?;
    store.save().map_err(CliError::from)?;
    println!("Imported {imported} model(s).");
    Ok(())
}
