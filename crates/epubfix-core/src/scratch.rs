//! Scratch directory that holds the unpacked archive for one run.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Either a unique temp dir (removed on drop) or a caller-chosen path.
#[derive(Debug)]
pub enum ScratchDir {
    Temp(TempDir),
    Explicit(PathBuf),
}

impl ScratchDir {
    /// Fresh, uniquely named directory under the system temp dir.
    pub fn unique() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("epubfix-")
            .tempdir()
            .context("create scratch directory")?;
        Ok(ScratchDir::Temp(dir))
    }

    /// Use `path`, wiping leftovers from an earlier run first.
    pub fn at(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!("removing stale scratch dir {}", path.display());
            fs::remove_dir_all(path)
                .with_context(|| format!("remove stale scratch dir {}", path.display()))?;
        }
        fs::create_dir_all(path)
            .with_context(|| format!("create scratch dir {}", path.display()))?;
        Ok(ScratchDir::Explicit(path.to_path_buf()))
    }

    /// `at(path)` when given, otherwise `unique()`.
    pub fn prepare(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::at(p),
            None => Self::unique(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ScratchDir::Temp(t) => t.path(),
            ScratchDir::Explicit(p) => p,
        }
    }

    /// Delete the directory. An explicit dir dropped without `close` stays on disk.
    pub fn close(self) -> Result<()> {
        match self {
            ScratchDir::Temp(t) => t.close().context("remove scratch directory"),
            ScratchDir::Explicit(p) => fs::remove_dir_all(&p)
                .with_context(|| format!("remove scratch dir {}", p.display())),
        }
    }
}
