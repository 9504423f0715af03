//! Embed remotely hosted placeholder images into EPUB archives.
//!
//! Paragraphs whose whole text is a marker followed by an image URL (for
//! example `<图片>https://…mitemin.net/…`) are replaced by an `<img>` pointing
//! at a local copy of the image stored inside the archive.

pub mod archive;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod markup;
pub mod pipeline;
pub mod placeholder;
pub mod retry;
pub mod rewriter;
pub mod scratch;
pub mod url_model;
