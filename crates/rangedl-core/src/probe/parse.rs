//! Parse HTTP response header lines into ResourceMetadata.

use super::{MetadataError, ResourceMetadata};

pub(crate) fn parse_headers(lines: &[String]) -> Result<ResourceMetadata, MetadataError> {
    let mut total_size = None;
    let mut accept_ranges = None;
    let mut etag = None;

    for line in lines {
        let Some((name, value)) = line.trim().split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            total_size = value.parse::<u64>().ok();
        } else if name.eq_ignore_ascii_case("accept-ranges") {
            accept_ranges = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("etag") {
            etag = Some(value.trim_matches('"').to_string());
        }
    }

    Ok(ResourceMetadata {
        total_size: total_size.ok_or(MetadataError::MissingContentLength)?,
        accept_ranges,
        etag,
    })
}
