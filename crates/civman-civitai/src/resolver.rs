//! Model page URL resolution.

use std::sync::LazyLock;

use civman_core::ResolvedUrl;
use regex::Regex;

/// `/models/{id}...modelVersionId={version}`
static WITH_VERSION_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/models/(\d+).*?modelVersionId=(\d+)").expect("valid regex")
});

/// `/models/{id}/versions/{version}`
static WITH_VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/models/(\d+)/versions/(\d+)").expect("valid regex"));

/// `/models/{id}`
static MODEL_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/models/(\d+)").expect("valid regex"));

/// Extract the model id and optional version id from a model page URL.
///
/// Patterns are tried in order (query parameter, path segment, bare id) and
/// the first match wins. Returns [`ResolvedUrl::UNRESOLVED`] when nothing
/// matches.
#[must_use]
pub fn resolve_model_url(url: &str) -> ResolvedUrl {
    for pattern in [&*WITH_VERSION_PARAM, &*WITH_VERSION_SEGMENT] {
        if let Some(caps) = pattern.captures(url) {
            let model = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let version = caps.get(2).and_then(|m| m.as_str().parse().ok());
            if let (Some(model), Some(version)) = (model, version) {
                return ResolvedUrl::new(model, Some(version));
            }
        }
    }

    MODEL_ONLY
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .map_or(ResolvedUrl::UNRESOLVED, |model| ResolvedUrl::new(model, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_query_parameter() {
        let resolved = resolve_model_url("https://civitai.com/models/4201/realistic-vision?modelVersionId=130072");
        assert_eq!(resolved, ResolvedUrl::new(4201, Some(130_072)));
    }

    #[test]
    fn test_version_path_segment() {
        let resolved = resolve_model_url("https://civitai.com/models/4201/versions/130072");
        assert_eq!(resolved, ResolvedUrl::new(4201, Some(130_072)));
    }

    #[test]
    fn test_bare_model_id() {
        let resolved = resolve_model_url("https://civitai.com/models/4201/realistic-vision");
        assert_eq!(resolved, ResolvedUrl::new(4201, None));
    }

    #[test]
    fn test_query_parameter_beats_path_segment() {
        let resolved =
            resolve_model_url("https://civitai.com/models/1/versions/2?modelVersionId=3");
        assert_eq!(resolved, ResolvedUrl::new(1, Some(3)));
    }

    #[test]
    fn test_unrecognized_urls() {
        for url in [
            "",
            "not a url",
            "https://civitai.com/images/123",
            "https://civitai.com/models/abc",
            "https://civitai.com/user/models",
        ] {
            assert_eq!(resolve_model_url(url), ResolvedUrl::UNRESOLVED, "{url}");
        }
    }

    #[test]
    fn test_overflowing_id_is_unresolved() {
        let resolved = resolve_model_url("https://civitai.com/models/99999999999999999999999");
        assert!(!resolved.is_resolved());
    }
}
