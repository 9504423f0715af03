//! CLI for epubfix.

mod commands;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use epubfix_core::config::{self, FixerConfig};
use std::path::PathBuf;

use commands::run_fix;

/// Embed remotely hosted placeholder images into an EPUB.
#[derive(Debug, Parser)]
#[command(name = "epubfix", version)]
#[command(about = "Download placeholder images and embed them into an EPUB", long_about = None)]
pub struct Cli {
    /// EPUB to repair.
    pub input: PathBuf,

    /// Where to write the repaired EPUB.
    pub output: PathBuf,

    /// Config file (default: ~/.config/epubfix/config.toml if present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Unpack into this directory instead of a unique temp dir. Wiped first, removed on success.
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Content root inside the archive (e.g. "content" or "OEBPS").
    #[arg(long, value_name = "DIR")]
    pub content_dir: Option<String>,

    /// Only fetch images whose host contains this substring.
    #[arg(long, value_name = "SUBSTR")]
    pub trusted_host: Option<String>,

    /// Placeholder tag preceding the image URL.
    #[arg(long, value_name = "TEXT")]
    pub marker: Option<String>,

    /// Log to ~/.local/state/epubfix/epubfix.log instead of stderr.
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Parse process arguments. Usage errors exit with status 1; help and version with 0.
    pub fn parse_or_exit() -> Self {
        match Cli::try_parse() {
            Ok(cli) => cli,
            Err(e) => {
                let code = match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                    _ => 1,
                };
                let _ = e.print();
                std::process::exit(code);
            }
        }
    }

    pub fn run(self) -> Result<()> {
        let mut cfg = config::load(self.config.as_deref())?;
        self.apply_overrides(&mut cfg);
        tracing::debug!("effective config: {:?}", cfg);
        run_fix(&self.input, &self.output, &cfg, self.scratch_dir.as_deref())
    }

    /// Command-line flags win over config file values.
    fn apply_overrides(&self, cfg: &mut FixerConfig) {
        if let Some(dir) = &self.content_dir {
            cfg.content_dir = dir.clone();
        }
        if let Some(host) = &self.trusted_host {
            cfg.trusted_host = host.clone();
        }
        if let Some(marker) = &self.marker {
            cfg.marker = marker.clone();
        }
    }
}

#[cfg(test)]
mod tests;
