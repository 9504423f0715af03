use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use zip::ZipArchive;

/// Extracts every entry of `archive_path` under `dest`, keeping relative paths.
/// Returns the number of entries. Entries escaping `dest` fail the extraction.
pub fn unpack(archive_path: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive_path)
        .with_context(|| format!("open archive {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("read archive {}", archive_path.display()))?;
    archive
        .extract(dest)
        .with_context(|| format!("extract {} into {}", archive_path.display(), dest.display()))?;
    tracing::debug!("unpacked {} entries into {}", archive.len(), dest.display());
    Ok(archive.len())
}
