//! Model search.

use civman_core::{ModelSummary, SearchOptions};
use tracing::info;

use super::CivitaiClient;
use crate::error::CivitaiResult;
use crate::http::HttpBackend;
use crate::parsing::parse_search_items;
use crate::url::build_search_url;

impl<B: HttpBackend> CivitaiClient<B> {
    /// One page of search results.
    pub(crate) async fn search_models(
        &self,
        options: &SearchOptions,
    ) -> CivitaiResult<Vec<ModelSummary>> {
        let url = build_search_url(&self.base_url, options);
        let response = self.get_json(&url).await?;
        let hits = parse_search_items(&response);
        info!(query = %options.query, count = hits.len(), "Search finished");
        Ok(hits)
    }
}
