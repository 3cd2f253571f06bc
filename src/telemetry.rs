use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, TelemetryConfig};

const DEFAULT_FILTER: &str = "info";

/// Initialize logging
///
/// With telemetry enabled, logs are appended to the configured file so the
/// console stays free for the trainer; otherwise they go to stdout. `RUST_LOG`
/// overrides the default `info` level.
pub fn init(config: &TelemetryConfig) -> Result<()> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref());

    if !config.enabled {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
        return Ok(());
    }

    let log_path = Config::expand_path(&config.log_path)?;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_target(false)
        .with_ansi(false)
        .init();

    tracing::info!("telemetry initialized: {}", log_path.display());

    Ok(())
}

fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
