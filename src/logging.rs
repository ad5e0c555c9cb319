//! Tracing subscriber setup.
//!
//! The terminal UI owns stdout/stderr while it runs, so interactive sessions only log
//! when a log file is configured.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Pick the filter: explicit level, then `RUST_LOG`, then the default.
fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(l) => EnvFilter::try_new(l).with_context(|| format!("invalid log level: {l}")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

pub fn init(level: Option<&str>, log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let filter = build_filter(level)?;

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))?;
    } else if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))?;
    }
    Ok(())
}
