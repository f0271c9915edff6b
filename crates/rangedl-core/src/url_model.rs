//! Destination naming from the download URL.

use std::path::{Path, PathBuf};

/// Used when the URL path has no usable last segment.
pub const FALLBACK_FILENAME: &str = "download.bin";

/// Extracts the last path segment from a URL for use as a filename.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.rev().find(|s| !s.is_empty())?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Full destination path for `url` inside `dir`.
pub fn destination_path(dir: &Path, url: &str) -> PathBuf {
    let name = filename_from_url_path(url).unwrap_or_else(|| FALLBACK_FILENAME.to_string());
    dir.join(name)
}
