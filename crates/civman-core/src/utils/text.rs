//! HTML stripping and URL extraction.

use std::sync::LazyLock;

use regex::Regex;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("valid regex"));

static MODEL_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://civitai\.com/models/\S+").expect("valid regex"));

/// Remove HTML tags, keeping the text between them.
#[must_use]
pub fn strip_html(html: &str) -> String {
    HTML_TAG.replace_all(html, "").into_owned()
}

/// Every model page URL found in free text, in order, without duplicates.
#[must_use]
pub fn extract_model_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for m in MODEL_URL.find_iter(text) {
        let url = m
            .as_str()
            .trim_end_matches(|c| matches!(c, '"' | '\'' | ')' | ']' | '>' | ',' | '.'));
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}
