//! `civman search`: query the platform catalog.

use anyhow::Result;
use civman_core::{ModelCategory, SearchOptions};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::display_search_results;

/// Arguments of the search command.
pub struct SearchArgs {
    pub query: String,
    pub tags: Vec<String>,
    pub types: Vec<String>,
    pub base_models: Vec<String>,
    pub nsfw: Option<bool>,
    pub limit: u32,
}

impl SearchArgs {
    /// Turn command-line filters into search options.
    pub fn into_options(self) -> Result<SearchOptions, CliError> {
        if self.limit == 0 {
            return Err(CliError::Arguments("--limit must be at least 1".to_string()));
        }
        Ok(SearchOptions {
            query: self.query.trim().to_string(),
            tags: self.tags,
            types: self
                .types
                .iter()
                .map(|t| t.parse().unwrap_or(ModelCategory::Other))
                .collect(),
            base_models: self.base_models,
            nsfw: self.nsfw,
            limit: self.limit,
        })
    }
}

/// Execute the search command.
pub async fn execute(ctx: &CliContext, args: SearchArgs) -> Result<()> {
    let options = args.into_options()?;
    let results = ctx.client.search(&options).await.map_err(CliError::from)?;
    display_search_results(&results);
    Ok(())
}
