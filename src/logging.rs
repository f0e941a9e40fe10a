//! Tracing subscriber setup
//!
//! Logs go to a file only; the terminal belongs to the viewer.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "GITRAFFE_LOG";

/// `GITRAFFE_LOG` if set and valid, `info` otherwise
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing to `log_file_path` (truncated)
pub fn init_global(log_file_path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = log_file_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating log dir {}", dir.display()))?;
    }
    let log_file = File::create(log_file_path)
        .with_context(|| format!("creating log file {}", log_file_path.display()))?;

    tracing::subscriber::set_global_default(build_subscriber(log_file, env_filter()))
        .context("installing tracing subscriber")?;
    Ok(())
}

pub fn build_subscriber(
    log_file: File,
    filter: EnvFilter,
) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(filter)
}
