//! `civman list` and `civman show`: read the local catalog.

use anyhow::Result;
use civman_catalog::CatalogError;
use civman_core::{AssetRecord, ModelCategory};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{display_model_details, print_model_table};

/// Catalog entries matching the filters, in catalog order.
pub fn filter_records<'a>(
    records: impl Iterator<Item = &'a AssetRecord>,
    favorites_only: bool,
    category: Option<ModelCategory>,
) -> Vec<&'a AssetRecord> {
    records
        .filter(|record| !favorites_only || record.favorite)
        .filter(|record| category.is_none_or(|c| record.category == c))
        .collect()
}

/// Execute the list command.
pub fn execute(ctx: &CliContext, favorites_only: bool, category: Option<&str>) -> Result<()> {
    let category = category.map(|c| c.parse().unwrap_or(ModelCategory::Other));
    let store = ctx.catalog.lock();
    let records = filter_records(store.list(), favorites_only, category);

    if records.is_empty() {
        if store.is_empty() {
            println!("The catalog is empty. Use 'civman download <url>' to add models.");
        } else {
            println!("No models match the filters.");
        }
        return Ok(());
    }

    print_model_table(records.iter().copied());
    println!();
    println!("{} of {} model(s)", records.len(), store.len());
    Ok(())
}

/// Execute the show command.
pub fn show(ctx: &CliContext, id: u64) -> Result<()> {
    let store = ctx.catalog.lock();
    let record = store
        .get(id)
        .ok_or_else(|| CliError::from(CatalogError::NotFound(id)))?;
    display_model_details(record);
    Ok(())
}
