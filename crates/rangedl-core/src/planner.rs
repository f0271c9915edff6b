//! Part planning: split `[0, total_size)` into fixed-size inclusive byte ranges.

use thiserror::Error;

/// One part of the download: inclusive byte range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartSpec {
    /// Position of this part in the plan.
    pub index: usize,
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl PartSpec {
    /// Length of this part in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// HTTP Range header value: `bytes=start-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
}

/// Number of parts needed to cover `total_size` with `chunk_size` pieces.
pub fn part_count(total_size: u64, chunk_size: u64) -> Result<u64, PlanError> {
    if chunk_size == 0 {
        return Err(PlanError::ZeroChunkSize);
    }
    Ok(total_size.div_ceil(chunk_size))
}

/// Builds the part plan for `total_size` bytes in `chunk_size` pieces.
///
/// Every part but the last is exactly `chunk_size` long; the last is clamped
/// to `total_size - 1`, the final valid inclusive offset. Zero bytes yield no
/// parts.
pub fn plan_parts(total_size: u64, chunk_size: u64) -> Result<Vec<PartSpec>, PlanError> {
    let count = part_count(total_size, chunk_size)?;
    let last_byte = total_size.saturating_sub(1);

    Ok((0..count)
        .map(|i| {
            let start = i * chunk_size;
            let end = start.saturating_add(chunk_size - 1).min(last_byte);
            PartSpec {
                index: i as usize,
                start,
                end,
            }
        })
        .collect())
}
