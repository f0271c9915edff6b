//! Per-part failure type.

use crate::storage::StorageError;
use thiserror::Error;

/// Why one part could not be fetched or written. Never fatal to the run and
/// never retried.
#[derive(Debug, Error)]
pub enum PartFetchError {
    /// Curl reported an error (connection, DNS, read, ...).
    #[error("transfer failed: {0}")]
    Transport(#[from] curl::Error),
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),
    /// The body length did not match the requested range.
    #[error("expected {expected} bytes, received {received}")]
    LengthMismatch { expected: u64, received: u64 },
    /// Writing the body into the destination file failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The worker thread for this part could not be started.
    #[error("could not start worker: {0}")]
    Spawn(#[source] std::io::Error),
    /// The worker thread for this part panicked.
    #[error("worker panicked")]
    WorkerPanicked,
}
