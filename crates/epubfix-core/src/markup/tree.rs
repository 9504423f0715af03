//! Span-preserving element tree built from quick-xml events.

use std::ops::Range;

use quick_xml::events::{BytesText, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Source could not be tokenized as XML.
#[derive(Debug, Error)]
#[error("malformed markup at byte {position}: {source}")]
pub struct MarkupError {
    pub position: usize,
    #[source]
    pub source: quick_xml::Error,
}

/// A parsed document: its top-level nodes.
#[derive(Debug, Clone, Default)]
pub struct Markup {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Text),
}

/// Character data with entities resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub content: String,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local name, without namespace prefix.
    pub name: String,
    /// Start tag through end tag.
    pub span: Range<usize>,
    /// Between the start and end tag; empty for `<x/>`.
    pub content: Range<usize>,
    pub children: Vec<Node>,
}

impl Element {
    /// Concatenation of all descendant text, each piece trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t.content.trim()),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// True if this element lies entirely inside `span`.
    pub fn is_within(&self, span: &Range<usize>) -> bool {
        span.start <= self.span.start && self.span.end <= span.end
    }
}

/// Depth-first, document-order walk over elements.
pub struct Elements<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(node) = self.stack.pop() {
            if let Node::Element(e) = node {
                self.stack.extend(e.children.iter().rev());
                return Some(e);
            }
        }
        None
    }
}

/// The five XML entities plus those common in HTML-flavoured XHTML.
fn resolve_html_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "hellip" => "\u{2026}",
        "middot" => "\u{b7}",
        "copy" => "\u{a9}",
        _ => return None,
    })
}

fn decode_text(t: &BytesText<'_>) -> String {
    match t.unescape_with(resolve_html_entity) {
        Ok(s) => s.into_owned(),
        // Unknown entity: keep the raw text rather than failing the document.
        Err(_) => String::from_utf8_lossy(t).into_owned(),
    }
}

const BOM: char = '\u{feff}';

struct Open {
    name: String,
    start: usize,
    content_start: usize,
    children: Vec<Node>,
}

impl Open {
    fn close(self, content_end: usize, end: usize) -> Element {
        Element {
            name: self.name,
            span: self.start..end,
            content: self.content_start..content_end,
            children: self.children,
        }
    }
}

fn attach(stack: &mut [Open], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

impl Markup {
    /// Parses `src` leniently: mismatched end tags close the nearest matching
    /// open element, stray end tags are ignored, and elements still open at the
    /// end of input are closed there.
    pub fn parse(src: &str) -> Result<Self, MarkupError> {
        // The reader would drop a leading BOM silently and shift every position
        // it reports, so strip it here and offset all spans by its length.
        let (body, base) = match src.strip_prefix(BOM) {
            Some(rest) => (rest, BOM.len_utf8()),
            None => (src, 0),
        };
        let mut reader = Reader::from_str(body);
        reader.check_end_names(false);

        let mut roots = Vec::new();
        let mut stack: Vec<Open> = Vec::new();
        // Events are contiguous: each starts where the previous one ended.
        let mut last_end = base;

        loop {
            let event = reader.read_event().map_err(|source| MarkupError {
                position: base + reader.buffer_position(),
                source,
            })?;
            let start = last_end;
            // Markup events end right after their closing `>`. Text is measured by
            // its raw length since the reader may already have consumed the next `<`.
            let end = match &event {
                Event::Text(t) => start + t.len(),
                _ => base + reader.buffer_position(),
            };
            last_end = end;
            match event {
                Event::Start(e) => stack.push(Open {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    start,
                    content_start: end,
                    children: Vec::new(),
                }),
                Event::Empty(e) => {
                    let el = Element {
                        name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                        span: start..end,
                        content: end..end,
                        children: Vec::new(),
                    };
                    attach(&mut stack, &mut roots, Node::Element(el));
                }
                Event::End(e) => {
                    let name = e.local_name();
                    let name = String::from_utf8_lossy(name.as_ref());
                    let Some(idx) = stack.iter().rposition(|o| o.name == name) else {
                        continue;
                    };
                    while stack.len() > idx + 1 {
                        if let Some(open) = stack.pop() {
                            let el = open.close(start, start);
                            attach(&mut stack, &mut roots, Node::Element(el));
                        }
                    }
                    if let Some(open) = stack.pop() {
                        let el = open.close(start, end);
                        attach(&mut stack, &mut roots, Node::Element(el));
                    }
                }
                Event::Text(t) => {
                    let text = Text {
                        content: decode_text(&t),
                        span: start..end,
                    };
                    attach(&mut stack, &mut roots, Node::Text(text));
                }
                Event::CData(c) => {
                    let text = Text {
                        content: String::from_utf8_lossy(&c).into_owned(),
                        span: start..end,
                    };
                    attach(&mut stack, &mut roots, Node::Text(text));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        while let Some(open) = stack.pop() {
            let el = open.close(src.len(), src.len());
            attach(&mut stack, &mut roots, Node::Element(el));
        }

        Ok(Markup { nodes: roots })
    }

    pub fn elements(&self) -> Elements<'_> {
        Elements {
            stack: self.nodes.iter().rev().collect(),
        }
    }

    /// Elements whose local name matches `name` (ASCII case-insensitive).
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name.eq_ignore_ascii_case(name))
    }
}
