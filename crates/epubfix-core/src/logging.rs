//! Logging init: stderr by default, or a file under the XDG state dir.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Debug for our own crates, info for everything else. `RUST_LOG` overrides.
const DEFAULT_FILTER: &str = "info,epubfix=debug,epubfix_core=debug";

const LOG_FILE: &str = "epubfix.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/epubfix/epubfix.log`, creating the directory if needed.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("epubfix")?;
    xdg_dirs
        .place_state_file(LOG_FILE)
        .context("create epubfix state directory")
}

/// Append run logs to the XDG state log file and return its path.
///
/// Errors leave no subscriber installed so the caller can fall back to
/// [`init_logging_stderr`].
pub fn init_logging() -> Result<PathBuf> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!("epubfix {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());
    Ok(path)
}

/// Log to stderr. The CLI default.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
