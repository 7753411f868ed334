//! `civman favorite` and `civman scan`.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Set or clear the favorite mark.
pub fn favorite(ctx: &CliContext, id: u64, favorite: bool) -> Result<()> {
    let mut store = ctx.catalog.lock();
    store.set_favorite(id, favorite).map_err(CliError::from)?;
    store.save().map_err(CliError::from)?;
    if favorite {
        println!("Model {id} marked as favorite.");
    } else {
        println!("Model {id} is no longer a favorite.");
    }
    Ok(())
}

/// Rebuild catalog entries from the `metadata.json` files under the
/// destination root. Favorites and recorded sizes survive the rescan.
pub fn scan(ctx: &CliContext) -> Result<()> {
    let root = ctx.destination_root()?;
    let mut store = ctx.catalog.lock();
    let before = store.len();
    let found = store.rescan(&root).map_err(CliError::from)?;
    store.save().map_err(CliError::from)?;
    println!(
        "Scanned {}: {found} model(s) found, {} new.",
        root.display(),
        store.len().saturating_sub(before)
    );
    Ok(())
}
