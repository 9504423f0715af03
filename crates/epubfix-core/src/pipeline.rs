//! End-to-end run: unpack, rewrite every text document, repack.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::archive;
use crate::config::FixerConfig;
use crate::fetcher::{CurlSource, ImageFetcher, ImageSource};
use crate::placeholder::PlaceholderRules;
use crate::retry::RetryPolicy;
use crate::rewriter::DocumentRewriter;
use crate::scratch::ScratchDir;

/// File extensions treated as text documents.
const TEXT_EXTENSIONS: [&str; 3] = ["xhtml", "html", "htm"];

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Text documents found under the text directory.
    pub documents: usize,
    /// Documents written back with at least one embedded image.
    pub rewritten: usize,
    /// Documents skipped because they could not be read or parsed.
    pub skipped: usize,
    pub images_embedded: usize,
    pub images_failed: usize,
    /// Placeholders whose URL failed the trusted host check.
    pub placeholders_ignored: usize,
    /// Archive entries in the output.
    pub entries: usize,
}

/// Text documents under `dir`, sorted by path. A missing directory yields none.
pub fn find_text_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        tracing::warn!("text directory {} not found", dir.display());
        return Ok(Vec::new());
    }
    let mut docs = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_text = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| TEXT_EXTENSIONS.iter().any(|t| ext.eq_ignore_ascii_case(t)));
        if is_text {
            docs.push(entry.into_path());
        }
    }
    docs.sort();
    Ok(docs)
}

/// Runs the whole conversion with the curl-backed fetcher built from `cfg`.
pub fn fix_epub_images(
    input: &Path,
    output: &Path,
    cfg: &FixerConfig,
    scratch_dir: Option<&Path>,
) -> Result<RunSummary> {
    let policy = RetryPolicy::from_config(cfg.retry.as_ref());
    let mut fetcher = ImageFetcher::new(CurlSource::from_config(cfg), policy);
    run(input, output, cfg, &mut fetcher, scratch_dir)
}

/// Runs the whole conversion with the given fetcher.
///
/// Fatal: missing input, unpack or repack failure, scratch dir I/O.
/// Per-document and per-image failures are logged and leave the text as is.
pub fn run<S: ImageSource>(
    input: &Path,
    output: &Path,
    cfg: &FixerConfig,
    fetcher: &mut ImageFetcher<S>,
    scratch_dir: Option<&Path>,
) -> Result<RunSummary> {
    if !input.is_file() {
        anyhow::bail!("input file not found: {}", input.display());
    }

    let scratch = ScratchDir::prepare(scratch_dir)?;
    let root = scratch.path();
    tracing::info!("unpacking {} into {}", input.display(), root.display());
    archive::unpack(input, root)?;

    let images_dir = cfg.images_root(root);
    fs::create_dir_all(&images_dir)
        .with_context(|| format!("create {}", images_dir.display()))?;

    let docs = find_text_documents(&cfg.text_root(root))?;
    let mut summary = RunSummary {
        documents: docs.len(),
        ..RunSummary::default()
    };

    let rules = PlaceholderRules::new(cfg.marker.clone(), cfg.trusted_host.clone());
    let mut rewriter = DocumentRewriter::new(rules, cfg.image_href_dir(), fetcher);
    for (i, doc) in docs.iter().enumerate() {
        let shown = doc.strip_prefix(root).unwrap_or(doc);
        tracing::info!("[{}/{}] {}", i + 1, docs.len(), shown.display());
        match rewriter.rewrite_file(doc, &images_dir) {
            Ok(report) => {
                if report.changed() {
                    summary.rewritten += 1;
                }
                summary.images_embedded += report.replaced;
                summary.images_failed += report.failed;
                summary.placeholders_ignored += report.ignored;
            }
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", shown.display(), e);
                summary.skipped += 1;
            }
        }
    }

    summary.entries = archive::rebuild(root, output)?;
    scratch.close()?;

    tracing::info!(
        "done: {} documents, {} rewritten, {} images embedded, {} failed, {} ignored",
        summary.documents,
        summary.rewritten,
        summary.images_embedded,
        summary.images_failed,
        summary.placeholders_ignored
    );
    Ok(summary)
}
