//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to learn the resource size from
//! `Content-Length`. `Accept-Ranges` and `ETag` are captured as well, but only
//! the size drives planning.

mod parse;

use std::str;
use thiserror::Error;

/// Key headers from the HEAD response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    /// Total size in bytes, from `Content-Length`.
    pub total_size: u64,
    /// Raw `Accept-Ranges` value if present.
    pub accept_ranges: Option<String>,
    /// `ETag` value if present, without surrounding quotes.
    pub etag: Option<String>,
}

impl ResourceMetadata {
    /// True if the server advertised `Accept-Ranges: bytes`. Informational only.
    pub fn supports_ranges(&self) -> bool {
        self.accept_ranges
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("bytes"))
    }
}

/// Why the metadata probe failed. Always fatal to the run.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("HEAD request failed: {0}")]
    Transport(#[from] curl::Error),
    #[error("HEAD returned HTTP {0}")]
    Status(u32),
    #[error("HEAD response has no usable Content-Length")]
    MissingContentLength,
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects; only the final response's headers are considered.
/// Anything other than HTTP 200 is an error. Blocks the current thread;
/// call from `spawn_blocking` if used from async code.
pub fn probe(url: &str) -> Result<ResourceMetadata, MetadataError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?; // HEAD request
    easy.follow_location(true)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                let line = s.trim_end();
                // A new status line starts the headers of the next hop.
                if line.starts_with("HTTP/") {
                    headers.clear();
                }
                headers.push(line.to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if code != 200 {
        return Err(MetadataError::Status(code));
    }

    let metadata = parse::parse_headers(&headers)?;
    tracing::debug!(
        url,
        total_size = metadata.total_size,
        accept_ranges = ?metadata.accept_ranges,
        etag = ?metadata.etag,
        "probed resource"
    );
    Ok(metadata)
}
