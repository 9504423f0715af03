//! Fix command: embed placeholder images and write the new EPUB.

use anyhow::Result;
use epubfix_core::config::FixerConfig;
use epubfix_core::pipeline;
use std::path::Path;

pub fn run_fix(
    input: &Path,
    output: &Path,
    cfg: &FixerConfig,
    scratch_dir: Option<&Path>,
) -> Result<()> {
    let summary = pipeline::fix_epub_images(input, output, cfg, scratch_dir)?;
    println!(
        "{} documents scanned, {} rewritten, {} images embedded, {} failed",
        summary.documents, summary.rewritten, summary.images_embedded, summary.images_failed
    );
    if summary.placeholders_ignored > 0 {
        println!(
            "{} placeholders left as text (untrusted host)",
            summary.placeholders_ignored
        );
    }
    if summary.skipped > 0 {
        println!("{} documents skipped (see log)", summary.skipped);
    }
    println!("[done] new EPUB saved to: {}", output.display());
    Ok(())
}
