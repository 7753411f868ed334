//! `civman info`: show platform metadata for a model page URL.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::display_model_details;

/// Execute the info command.
pub async fn execute(ctx: &CliContext, url: &str) -> Result<()> {
    let resolved = ctx.client.resolve_url(url);
    let Some(model_id) = resolved.model_id else {
        return Err(CliError::Arguments(format!("Invalid URL format: {url}")).into());
    };

    let asset = ctx
        .client
        .fetch_metadata(model_id, resolved.version_id)
        .await
        .map_err(CliError::from)?;
    display_model_details(&asset);

    println!();
    println!("Download URL: {}", asset.download_url);
    if ctx.catalog.lock().contains(asset.id) {
        println!("Already in the local catalog (civman show {}).", asset.id);
    }
    Ok(())
}
