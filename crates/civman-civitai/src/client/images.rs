//! Image gallery aggregation.
//!
//! NSFW and SFW listings are paginated independently and concurrently, then
//! merged (NSFW first), de-duplicated by id and ranked by popularity.

use civman_core::ImageRecord;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::CivitaiClient;
use crate::http::HttpBackend;
use crate::models::ImageFilter;
use crate::parsing::parse_images_page;
use crate::url::{ImagesQuery, build_images_url};

impl<B: HttpBackend> CivitaiClient<B> {
    /// Fetch at most `max_images` gallery images, best first.
    ///
    /// Errors never propagate: each listing stops at its first failed page
    /// and whatever was collected is still merged.
    pub(crate) async fn fetch_ranked_images(
        &self,
        model_id: u64,
        version_id: Option<u64>,
        max_images: usize,
    ) -> Vec<ImageRecord> {
        if max_images == 0 {
            return Vec::new();
        }

        info!(model_id, ?version_id, "Fetching images");
        let (unsafe_items, safe_items) = tokio::join!(
            self.fetch_all_pages(model_id, version_id, max_images, ImageFilter::Unsafe),
            self.fetch_all_pages(model_id, version_id, max_images, ImageFilter::Safe),
        );

        let images = merge_and_rank(unsafe_items, safe_items, max_images);
        info!(model_id, count = images.len(), "Found images");
        images
    }

    /// Follow the cursor of one listing until it runs dry or `max_images`
    /// items have been collected.
    async fn fetch_all_pages(
        &self,
        model_id: u64,
        version_id: Option<u64>,
        max_images: usize,
        filter: ImageFilter,
    ) -> Vec<ImageRecord> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let url = build_images_url(
                &self.base_url,
                &ImagesQuery {
                    model_id,
                    version_id,
                    limit: self.config.fetch_batch_size,
                    filter,
                    cursor: cursor.as_deref(),
                },
            );

            let response = match self.get_json(&url).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        model_id,
                        nsfw = filter.as_param(),
                        collected = items.len(),
                        error = %e,
                        "Image listing failed, keeping partial results"
                    );
                    break;
                }
            };

            let page = parse_images_page(&response);
            // Counted before entries without an id are dropped.
            if page.raw_count == 0 {
                break;
            }

            items.extend(page.items);
            debug!(nsfw = filter.as_param(), total = items.len(), "Fetched image page");

            if items.len() >= max_images {
                break;
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        items
    }
}

/// Merge both listings, keep one entry per id, rank and truncate.
///
/// A later duplicate replaces the earlier value but keeps its position, and
/// the sort is stable, so equal scores stay in merge order.
pub(crate) fn merge_and_rank(
    unsafe_items: Vec<ImageRecord>,
    safe_items: Vec<ImageRecord>,
    max_images: usize,
) -> Vec<ImageRecord> {
    let mut unique: IndexMap<u64, ImageRecord> = IndexMap::new();
    for image in unsafe_items.into_iter().chain(safe_items) {
        unique.insert(image.id, image);
    }

    let mut ranked: Vec<ImageRecord> = unique.into_values().collect();
    ranked.sort_by(|a, b| b.score().cmp(&a.score()));
    ranked.truncate(max_images);
    ranked
}
