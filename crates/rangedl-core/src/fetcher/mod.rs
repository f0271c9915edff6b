//! Single-part HTTP Range GET and write to the destination file.
//!
//! The body of each part is buffered in memory and written in one positional
//! write once the transfer succeeded, so a failed part never leaves partial
//! data behind: its region keeps whatever the preallocator put there.

mod error;
mod http;

pub use error::PartFetchError;
pub use http::HttpRangeSource;

use crate::planner::PartSpec;
use crate::storage::StorageWriter;

/// Something that can return the bytes of one part of a resource.
///
/// Implementors perform exactly one retrieval per call; retries are not part
/// of the contract.
pub trait RangeSource: Send + Sync {
    /// Fetch the inclusive byte range described by `part`.
    fn fetch(&self, url: &str, part: &PartSpec) -> Result<Vec<u8>, PartFetchError>;
}

/// Fetch one part through `source` and write it at `part.start`.
///
/// Returns the number of bytes written. The body must be exactly `part.len()`
/// bytes; anything else is rejected before touching the file.
pub fn fetch_part(
    source: &dyn RangeSource,
    url: &str,
    part: &PartSpec,
    storage: &StorageWriter,
) -> Result<u64, PartFetchError> {
    let body = source.fetch(url, part)?;
    let received = body.len() as u64;
    let expected = part.len();
    if received != expected {
        return Err(PartFetchError::LengthMismatch { expected, received });
    }
    storage.write_at(part.start, &body)?;
    Ok(received)
}
