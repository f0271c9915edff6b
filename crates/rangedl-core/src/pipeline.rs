//! One download run: probe, preallocate, plan, fetch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::fetcher::{HttpRangeSource, RangeSource};
use crate::gate::AdmissionGate;
use crate::planner::{self, PlanError};
use crate::probe::{self, MetadataError, ResourceMetadata};
use crate::scheduler::{self, PartOutcome};
use crate::storage::{self, AllocationMode, StorageError};

/// Default bytes per part.
pub const DEFAULT_CHUNK_SIZE: u64 = 30_000_000;

/// Knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Maximum range requests in flight at once.
    pub concurrency: usize,
    /// Bytes per part.
    pub chunk_size: u64,
    pub allocation: AllocationMode,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            allocation: AllocationMode::default(),
        }
    }
}

impl DownloadOptions {
    pub fn validate(&self) -> Result<(), DownloadError> {
        if self.concurrency == 0 {
            return Err(DownloadError::ZeroConcurrency);
        }
        if self.chunk_size == 0 {
            return Err(PlanError::ZeroChunkSize.into());
        }
        Ok(())
    }
}

/// Half the available parallelism, at least 1.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

/// Failures that abort the whole run before any part is fetched.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,
    #[error("download task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// What a finished run did. A run can finish with failed parts; their byte
/// ranges in the destination are left as preallocated (zero or sparse).
#[derive(Debug)]
pub struct DownloadReport {
    pub metadata: ResourceMetadata,
    pub destination: PathBuf,
    pub outcomes: Vec<PartOutcome>,
    /// Wall-clock time from the end of the probe to the last part reporting.
    pub elapsed: Duration,
}

impl DownloadReport {
    pub fn part_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed_parts(&self) -> impl Iterator<Item = &PartOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// True when every part was written.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(PartOutcome::is_ok)
    }

    pub fn bytes_written(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }
}

/// Runs a download on the current thread with a caller-chosen range source.
pub fn download_with_source(
    url: &str,
    destination: &Path,
    opts: &DownloadOptions,
    source: Arc<dyn RangeSource>,
) -> Result<DownloadReport, DownloadError> {
    opts.validate()?;

    let metadata = probe::probe(url)?;
    if !metadata.supports_ranges() {
        tracing::debug!("server did not advertise Accept-Ranges: bytes; requesting ranges anyway");
    }
    let started = Instant::now();

    let storage = storage::preallocate(destination, metadata.total_size, opts.allocation)?;
    let parts = planner::plan_parts(metadata.total_size, opts.chunk_size)?;
    tracing::info!(
        url,
        destination = %destination.display(),
        total_size = metadata.total_size,
        parts = parts.len(),
        concurrency = opts.concurrency,
        "starting download"
    );

    let gate = Arc::new(AdmissionGate::new(opts.concurrency));
    let outcomes = scheduler::run_parts(url, &parts, &storage, gate, source);

    let report = DownloadReport {
        metadata,
        destination: destination.to_path_buf(),
        outcomes,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        parts = report.part_count(),
        failed = report.failed_parts().count(),
        bytes = report.bytes_written(),
        elapsed_secs = report.elapsed.as_secs_f64(),
        "download finished"
    );
    Ok(report)
}

/// Runs a download over HTTP on the current thread. Blocks until every part
/// has reported.
pub fn download_blocking(
    url: &str,
    destination: &Path,
    opts: &DownloadOptions,
) -> Result<DownloadReport, DownloadError> {
    download_with_source(url, destination, opts, Arc::new(HttpRangeSource))
}

/// Runs `download_blocking` in `spawn_blocking`.
pub async fn download(
    url: &str,
    destination: &Path,
    opts: DownloadOptions,
) -> Result<DownloadReport, DownloadError> {
    let url = url.to_string();
    let destination = destination.to_path_buf();
    tokio::task::spawn_blocking(move || download_blocking(&url, &destination, &opts)).await?
}
