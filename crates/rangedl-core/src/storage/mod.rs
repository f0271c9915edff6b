//! Destination file lifecycle.
//!
//! Creates the destination file, extends it to its final size before any part
//! is fetched, and hands out a shared writer for positional (pwrite-style)
//! writes from many threads at once.

mod builder;
mod writer;

pub use builder::StorageWriterBuilder;
pub use writer::StorageWriter;

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How the destination file is grown to its final size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    /// Seek to `size - 1` and write one zero byte; the filesystem leaves a hole.
    #[default]
    Sparse,
    /// Reserve real blocks with `posix_fallocate` where available, else `Sparse`.
    Reserve,
}

/// Failure to create, size, or write the destination file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to extend {} to {size} bytes: {source}", .path.display())]
    Extend {
        path: PathBuf,
        size: u64,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {len} bytes at offset {offset} in {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        offset: u64,
        len: usize,
        #[source]
        source: io::Error,
    },
}

/// Create (or truncate) `path`, grow it to exactly `size` bytes, and return a
/// writer ready for concurrent offset writes.
pub fn preallocate(path: &Path, size: u64, mode: AllocationMode) -> Result<StorageWriter, StorageError> {
    let mut builder = StorageWriterBuilder::create(path)?;
    builder.preallocate(size, mode)?;
    tracing::debug!(path = %path.display(), size, ?mode, "destination preallocated");
    Ok(builder.build())
}
