//! ZIP container handling for EPUB archives.
//!
//! Unpacking is a plain full extraction. Rebuilding writes the `mimetype`
//! entry first and uncompressed (the EPUB OCF rule), then every other file
//! deflated in directory-walk order.

mod rebuild;
mod unpack;

pub use rebuild::{collect_entries, rebuild, ArchiveEntry};
pub use unpack::unpack;

/// Entry that must come first and be stored without compression.
pub const MIMETYPE: &str = "mimetype";
