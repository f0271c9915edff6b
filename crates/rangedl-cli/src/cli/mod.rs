//! CLI for rangedl.

mod download;

use anyhow::{Context, Result};
use clap::Parser;
use rangedl_core::config::{self, RangedlConfig};
use rangedl_core::pipeline::DownloadOptions;
use std::path::PathBuf;

/// Download one file over HTTP with concurrent byte-range requests.
#[derive(Debug, Parser)]
#[command(name = "rangedl", version)]
#[command(about = "rangedl: concurrent byte-range downloader", long_about = None)]
pub struct Cli {
    /// Direct HTTP/HTTPS URL to download.
    pub url: String,

    /// Maximum range requests in flight at once [default: half the CPUs].
    #[arg(short, long, value_name = "N", value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Bytes fetched per range request [default: 30000000].
    #[arg(short = 's', long, value_name = "BYTES", value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: Option<u64>,

    /// Directory to save into [default: home directory].
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Effective settings after merging flags, config file, and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub options: DownloadOptions,
    pub download_dir: PathBuf,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init().context("loading config")?;
        tracing::debug!("loaded config: {:?}", cfg);

        let settings = cli.resolve(&cfg, dirs::home_dir)?;
        download::run_download(&cli.url, &settings).await
    }

    /// Flags win over the config file; the config file wins over defaults.
    /// Without an output directory anywhere, `home_dir` decides.
    pub fn resolve(
        &self,
        cfg: &RangedlConfig,
        home_dir: impl FnOnce() -> Option<PathBuf>,
    ) -> Result<RunSettings> {
        let mut options = cfg.download_options();
        if let Some(n) = self.concurrency {
            options.concurrency = n;
        }
        if let Some(size) = self.chunk_size {
            options.chunk_size = size;
        }

        let download_dir = match self.output_dir.clone().or_else(|| cfg.download_dir.clone()) {
            Some(dir) => dir,
            None => home_dir().context("could not resolve the home directory")?,
        };

        Ok(RunSettings {
            options,
            download_dir,
        })
    }
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    if n == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(n)
}
