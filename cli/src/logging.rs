use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "cookbook=info,cookbook_core=info";

/// Send tracing output to `<data_dir>/cookbook.log`.
///
/// The terminal is owned by the UI, so nothing is written to stderr.
/// `RUST_LOG` overrides the default filter.
pub fn init(data_dir: &Path) -> Result<()> {
    let path = data_dir.join("cookbook.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {e}"))?;

    info!(path = %path.display(), "logging initialized");
    Ok(())
}
