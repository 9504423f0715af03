//! Typed view of an XHTML document.
//!
//! The parser builds an explicit element tree where every element remembers
//! the byte span of its markup and of its content in the source text. Callers
//! find nodes by capability (e.g. "elements named `p`") and rewrite the source
//! by splicing spans, so untouched bytes stay exactly as they were.

mod escape;
mod tree;

pub use escape::{xml_escape_attr, xml_escape_text};
pub use tree::{Element, Elements, Markup, MarkupError, Node, Text};

use std::ops::Range;

/// Replaces each `(span, text)` in `src`. Spans must be sorted and disjoint.
pub fn splice(src: &str, edits: &[(Range<usize>, String)]) -> String {
    let mut out = String::with_capacity(src.len());
    let mut last = 0;
    for (span, replacement) in edits {
        out.push_str(&src[last..span.start]);
        out.push_str(replacement);
        last = span.end;
    }
    out.push_str(&src[last..]);
    out
}
