//! Streaming file downloads.
//!
//! Bytes go to `<name>.part` next to the target and the file is renamed
//! once the body has been fully written. A [`PartFile`] guard removes the
//! temporary file if the transfer fails or the future is dropped.

use std::path::{Path, PathBuf};

use civman_core::{FileFetch, ProgressFn};
use futures_util::StreamExt;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};
use url::Url;

use super::CivitaiClient;
use crate::error::{CivitaiError, CivitaiResult};
use crate::http::HttpBackend;

/// Bytes written per progress step.
pub(crate) const CHUNK_SIZE: usize = 8 * 1024;

impl<B: HttpBackend> CivitaiClient<B> {
    /// Download `url` into `dest_dir`.
    ///
    /// The file name comes from `Content-Disposition` when present, else
    /// from the last URL path segment. An existing target is returned as
    /// [`FileFetch::AlreadyPresent`] without reading the body.
    pub(crate) async fn download_to(
        &self,
        url: &str,
        dest_dir: &Path,
        on_progress: Option<&ProgressFn>,
    ) -> CivitaiResult<FileFetch> {
        let url = Url::parse(url)?;

        self.limiter.acquire().await;
        debug!(url = %url, "Opening download stream");
        let response = self.backend.open_stream(&url).await?;

        let file_name = response
            .content_disposition
            .as_deref()
            .and_then(parse_content_disposition)
            .or_else(|| file_name_from_url(&url))
            .and_then(|name| sanitize_file_name(&name))
            .ok_or_else(|| CivitaiError::MissingFileName {
                url: url.to_string(),
            })?;

        let target = dest_dir.join(&file_name);
        if fs::try_exists(&target).await.unwrap_or(false) {
            info!(path = %target.display(), "File already exists, skipping download");
            return Ok(FileFetch::AlreadyPresent { path: target });
        }

        fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| CivitaiError::io(dest_dir, e))?;

        let part_path = dest_dir.join(format!("{file_name}.part"));
        let mut guard = PartFile::new(part_path.clone());
        let file = fs::File::create(&part_path)
            .await
            .map_err(|e| CivitaiError::io(&part_path, e))?;
        let mut writer = BufWriter::new(file);

        let total = response.content_length.filter(|len| *len > 0);
        let mut written: u64 = 0;
        let mut body = response.body;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for piece in chunk.chunks(CHUNK_SIZE) {
                writer
                    .write_all(piece)
                    .await
                    .map_err(|e| CivitaiError::io(&part_path, e))?;
                written += piece.len() as u64;

                if let (Some(total), Some(report)) = (total, on_progress) {
                    report(percent(written, total));
                }
            }
        }

        writer
            .flush()
            .await
            .map_err(|e| CivitaiError::io(&part_path, e))?;
        let file = writer.into_inner();
        file.sync_all()
            .await
            .map_err(|e| CivitaiError::io(&part_path, e))?;
        drop(file);

        fs::rename(&part_path, &target)
            .await
            .map_err(|e| CivitaiError::io(&target, e))?;
        guard.disarm();

        info!(path = %target.display(), bytes = written, "Download complete");
        Ok(FileFetch::Downloaded {
            path: target,
            bytes: written,
        })
    }
}

/// Whole percentage, rounded down and capped at 100.
#[allow(clippy::cast_possible_truncation)]
fn percent(written: u64, total: u64) -> u8 {
    (written.saturating_mul(100) / total).min(100) as u8
}

/// Removes a temporary download file unless disarmed.
struct PartFile {
    path: PathBuf,
    armed: bool,
}

impl PartFile {
    const fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.armed {
            match std::fs::remove_file(&self.path) {
                Ok(()) => debug!(path = %self.path.display(), "Removed partial download"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %self.path.display(), error = %e, "Could not remove partial download"),
            }
        }
    }
}

/// File name from a `Content-Disposition` header.
///
/// `filename*=` (RFC 5987) wins over `filename=` when both are present.
fn parse_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for part in value.split(';') {
        let trimmed = part.trim();
        if let Some(rest) = trimmed.strip_prefix("filename*=") {
            let rest = rest.trim_matches('"');
            let encoded = rest.split("''").last().unwrap_or(rest);
            if let Ok(decoded) = urlencoding::decode(encoded) {
                if !decoded.trim().is_empty() {
                    return Some(decoded.into_owned());
                }
            }
        } else if let Some(rest) = trimmed.strip_prefix("filename=") {
            let name = rest.trim_matches(|c: char| c == '"' || c == ' ' || c == ';');
            if !name.is_empty() && plain.is_none() {
                plain = Some(name.to_string());
            }
        }
    }
    plain
}

/// Last non-empty path segment of the URL, percent-decoded.
fn file_name_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.rev().find(|s| !s.is_empty())?;
    let decoded = urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |d| d.into_owned());
    Some(decoded)
}

/// Strip path separators and characters that are invalid in file names.
fn sanitize_file_name(name: &str) -> Option<String> {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.trim_matches(|c| c == '_' || c == '.').is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
