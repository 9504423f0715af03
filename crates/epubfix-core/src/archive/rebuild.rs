use anyhow::{Context, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::MIMETYPE;

/// A file on disk and the name it gets inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    /// Path relative to the archive root, `/`-separated.
    pub arcname: String,
}

/// Every regular file under `root`, in walk order.
pub fn collect_entries(root: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.with_context(|| format!("walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} outside {}", entry.path().display(), root.display()))?;
        let arcname = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push(ArchiveEntry {
            path: entry.path().to_path_buf(),
            arcname,
        });
    }
    Ok(entries)
}

fn add_file(
    zip: &mut ZipWriter<File>,
    entry: &ArchiveEntry,
    opts: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(entry.arcname.as_str(), opts)
        .with_context(|| format!("start entry {}", entry.arcname))?;
    let mut f = File::open(&entry.path).with_context(|| format!("open {}", entry.path.display()))?;
    io::copy(&mut f, zip).with_context(|| format!("write entry {}", entry.arcname))?;
    Ok(())
}

/// Packs the tree under `root` into `output`: `mimetype` first and stored,
/// everything else deflated. Returns the number of entries written.
pub fn rebuild(root: &Path, output: &Path) -> Result<usize> {
    let entries = collect_entries(root)?;
    let file = File::create(output).with_context(|| format!("create {}", output.display()))?;
    let mut zip = ZipWriter::new(file);

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let (first, rest): (Vec<&ArchiveEntry>, Vec<&ArchiveEntry>) =
        entries.iter().partition(|e| e.arcname == MIMETYPE);
    if first.is_empty() {
        tracing::warn!("no {} entry in {}", MIMETYPE, root.display());
    }
    for entry in first {
        add_file(&mut zip, entry, stored)?;
    }
    for entry in &rest {
        add_file(&mut zip, entry, deflated)?;
    }

    zip.finish()
        .with_context(|| format!("finish {}", output.display()))?;
    tracing::debug!("wrote {} entries to {}", entries.len(), output.display());
    Ok(entries.len())
}
