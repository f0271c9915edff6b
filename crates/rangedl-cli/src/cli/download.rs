//! Drive one download and turn its report into console output and an exit status.

use anyhow::{Context, Result};
use rangedl_core::pipeline::{self, DownloadReport};
use rangedl_core::url_model;

use super::RunSettings;

pub async fn run_download(url: &str, settings: &RunSettings) -> Result<()> {
    let destination = url_model::destination_path(&settings.download_dir, url);
    let report = pipeline::download(url, &destination, settings.options)
        .await
        .with_context(|| format!("download of {} failed", url))?;

    println!("{}", report.elapsed.as_secs_f64());
    ensure_complete(&report)
}

/// Fails when any part is missing from the output file.
///
/// Each failed part has already been logged with its byte range by the
/// scheduler; this only turns the count into the command's error.
pub(super) fn ensure_complete(report: &DownloadReport) -> Result<()> {
    let failed = report.failed_parts().count();
    if failed == 0 {
        tracing::info!(path = %report.destination.display(), bytes = report.metadata.total_size, "saved");
        return Ok(());
    }
    anyhow::bail!(
        "{} of {} parts failed; {} is incomplete",
        failed,
        report.part_count(),
        report.destination.display()
    )
}
