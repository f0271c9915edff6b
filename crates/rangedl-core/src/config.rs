use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::{self, DownloadOptions};
use crate::storage::AllocationMode;

/// Global configuration loaded from `~/.config/rangedl/config.toml`.
///
/// Command-line flags override these values; these override built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangedlConfig {
    /// Maximum range requests in flight. `None` = half the available parallelism.
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Bytes per part.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
    /// How the destination file is grown before parts are written.
    #[serde(default)]
    pub allocation: AllocationMode,
    /// Directory for downloaded files. `None` = the user's home directory.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

fn default_chunk_size() -> u64 {
    pipeline::DEFAULT_CHUNK_SIZE
}

impl Default for RangedlConfig {
    fn default() -> Self {
        Self {
            concurrency: None,
            chunk_size: default_chunk_size(),
            allocation: AllocationMode::default(),
            download_dir: None,
        }
    }
}

impl RangedlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == Some(0) {
            anyhow::bail!("config: concurrency must be at least 1");
        }
        if self.chunk_size == 0 {
            anyhow::bail!("config: chunk_size must be at least 1");
        }
        Ok(())
    }

    /// Download options from this config, before command-line overrides.
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            concurrency: self
                .concurrency
                .unwrap_or_else(pipeline::default_concurrency),
            chunk_size: self.chunk_size,
            allocation: self.allocation,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rangedl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RangedlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RangedlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load and validate configuration from a specific file.
pub fn load_from_path(path: &Path) -> Result<RangedlConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: RangedlConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}
