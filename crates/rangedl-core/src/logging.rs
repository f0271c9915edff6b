//! Logging init: human-readable events on stderr, filtered by `RUST_LOG`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset: failures from anywhere, run
/// milestones from rangedl itself.
pub const DEFAULT_FILTER: &str = "warn,rangedl_core=info,rangedl_cli=info";

/// Initialize structured logging to stderr.
///
/// Returns Err if a global subscriber is already installed.
pub fn init_logging() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}
