//! Document rewriter: turn placeholder paragraphs into embedded image references.

use anyhow::{Context, Result};
use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::fetcher::{ImageFetcher, ImageSource};
use crate::markup::{splice, xml_escape_attr, Markup, MarkupError};
use crate::placeholder::{Candidate, PlaceholderRules};

/// Per-document outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Placeholders replaced by an image reference.
    pub replaced: usize,
    /// Accepted placeholders whose download failed (left as text).
    pub failed: usize,
    /// Placeholders with an untrusted or non-HTTP URL (left as text).
    pub ignored: usize,
}

impl RewriteReport {
    pub fn changed(&self) -> bool {
        self.replaced > 0
    }
}

/// Rewrites placeholder paragraphs using an [`ImageFetcher`].
pub struct DocumentRewriter<'f, S> {
    rules: PlaceholderRules,
    /// Directory part of the `src` attribute, e.g. `../images`.
    href_dir: String,
    fetcher: &'f mut ImageFetcher<S>,
}

impl<'f, S: ImageSource> DocumentRewriter<'f, S> {
    pub fn new(
        rules: PlaceholderRules,
        href_dir: impl Into<String>,
        fetcher: &'f mut ImageFetcher<S>,
    ) -> Self {
        Self {
            rules,
            href_dir: href_dir.into(),
            fetcher,
        }
    }

    /// Rewrites one document in place. The file is only written when at least
    /// one paragraph changed; otherwise it is left byte-identical.
    pub fn rewrite_file(&mut self, path: &Path, images_dir: &Path) -> Result<RewriteReport> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let src = String::from_utf8(bytes)
            .with_context(|| format!("{} is not UTF-8", path.display()))?;

        let (rewritten, report) = self
            .rewrite_str(&src, images_dir)
            .with_context(|| format!("parse {}", path.display()))?;

        if let Some(out) = rewritten {
            fs::write(path, out).with_context(|| format!("write {}", path.display()))?;
            tracing::debug!("rewrote {} ({} images)", path.display(), report.replaced);
        }
        Ok(report)
    }

    /// Rewrites `src`, returning the new text only if something changed.
    pub fn rewrite_str(
        &mut self,
        src: &str,
        images_dir: &Path,
    ) -> Result<(Option<String>, RewriteReport), MarkupError> {
        let markup = Markup::parse(src)?;
        let mut report = RewriteReport::default();
        let mut edits: Vec<(Range<usize>, String)> = Vec::new();

        for p in markup.elements_named("p") {
            // Already swallowed by an enclosing replaced paragraph.
            if edits.last().is_some_and(|(span, _)| p.is_within(span)) {
                continue;
            }
            let text = p.text();
            match self.rules.classify(&text) {
                Candidate::None => {}
                Candidate::Rejected(url) => {
                    tracing::debug!("ignoring untrusted placeholder {}", url);
                    report.ignored += 1;
                }
                Candidate::Accepted(url) => match self.fetcher.fetch(url, images_dir) {
                    Some(name) => {
                        edits.push((p.content.clone(), self.img_tag(&name)));
                        report.replaced += 1;
                    }
                    None => report.failed += 1,
                },
            }
        }

        if edits.is_empty() {
            return Ok((None, report));
        }
        Ok((Some(splice(src, &edits)), report))
    }

    fn img_tag(&self, filename: &str) -> String {
        format!(
            r#"<img src="{}" alt=""/>"#,
            xml_escape_attr(&format!("{}/{}", self.href_dir, filename))
        )
    }
}
