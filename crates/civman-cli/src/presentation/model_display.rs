//! Catalog entry and search result rendering.

use civman_core::{AssetRecord, ModelSummary, format_size};

use super::tables::{print_separator, truncate_string};

const TABLE_WIDTH: usize = 96;

/// Print catalog entries as a table.
pub fn print_model_table<'a>(records: impl IntoIterator<Item = &'a AssetRecord>) {
    println!(
        "{:<9} {:<2} {:<38} {:<16} {:<14} {:>10}",
        "ID", "", "Name", "Type", "Base model", "Size"
    );
    print_separator(TABLE_WIDTH);
    for record in records {
        let star = if record.favorite { "*" } else { "" };
        let size = if record.size > 0 {
            format_size(record.size)
        } else {
            "-".to_string()
        };
        println!(
            "{:<9} {:<2} {:<38} {:<16} {:<14} {:>10}",
            record.id,
            star,
            truncate_string(&record.name, 38),
            truncate_string(record.category.as_str(), 16),
            truncate_string(&record.base_model, 14),
            size
        );
    }
}

/// Print every field of interest of one catalog entry.
pub fn display_model_details(record: &AssetRecord) {
    println!("{} (ID {})", record.name, record.id);
    print_separator(TABLE_WIDTH);
    println!("Version:     {} ({})", record.version_name, record.version_id);
    println!("Type:        {}", record.category);
    println!("Base model:  {}", record.base_model);
    if !record.creator.is_empty() {
        println!("Creator:     {}", record.creator);
    }
    println!("Page:        {}", record.page_url());
    println!("NSFW:        {}", if record.nsfw { "yes" } else { "no" });
    println!("Favorite:    {}", if record.favorite { "yes" } else { "no" });
    if record.is_downloaded() {
        println!("Size:        {}", format_size(record.size));
        println!("Downloaded:  {}", record.download_date);
    }
    if !record.last_updated.is_empty() {
        println!("Updated:     {}", record.last_updated);
    }
    if !record.tags.is_empty() {
        println!("Tags:        {}", record.tags.join(", "));
    }
    let local = record
        .images
        .iter()
        .filter(|image| image.local_path.is_some())
        .count();
    println!("Images:      {} ({local} on disk)", record.images.len());
    if !record.thumbnail.is_empty() {
        println!("Thumbnail:   {}", record.thumbnail);
    }
    if !record.description.is_empty() {
        println!();
        println!("{}", truncate_string(&record.description, 600));
    }
}

/// Print search hits, most downloaded first as returned by the platform.
pub fn display_search_results(results: &[ModelSummary]) {
    if results.is_empty() {
        println!("No models found.");
        return;
    }
    println!(
        "{:<9} {:<40} {:<16} {:<14} {:>10}",
        "ID", "Name", "Type", "Base model", "Downloads"
    );
    print_separator(TABLE_WIDTH);
    for hit in results {
        println!(
            "{:<9} {:<40} {:<16} {:<14} {:>10}",
            hit.id,
            truncate_string(&hit.name, 40),
            truncate_string(hit.category.as_str(), 16),
            truncate_string(hit.latest_base_model.as_deref().unwrap_or("-"), 14),
            hit.download_count()
        );
    }
    println!();
    println!("Download with: civman download https://civitai.com/models/<ID>");
}
