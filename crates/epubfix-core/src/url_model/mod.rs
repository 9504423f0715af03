//! URL modeling and image filename derivation.
//!
//! Derives a local filename for a downloaded image from the URL path, falling
//! back to a synthetic name hashed from the whole URL.

mod path;
mod sanitize;

pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename;

use sha2::{Digest, Sha256};

/// Extension used for synthetic names (the image is re-encoded to match).
const SYNTHETIC_EXT: &str = "jpg";

/// Hex characters of the SHA-256 digest kept in synthetic names.
const SYNTHETIC_HASH_LEN: usize = 16;

/// Derives the local filename for an image URL.
///
/// Uses the last path segment of `url`, percent-decoded and sanitized. When the
/// URL has no usable basename, returns [`synthetic_filename`].
///
/// # Examples
///
/// - `derive_image_filename("https://example.com/i/pic.jpg")` → `"pic.jpg"`
/// - `derive_image_filename("https://example.com/")` → `"img_<16 hex>.jpg"`
pub fn derive_image_filename(url: &str) -> String {
    filename_from_url_path(url)
        .map(|raw| sanitize_filename(&raw))
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| synthetic_filename(url))
}

/// Deterministic `img_<hash>.jpg` name from a truncated SHA-256 of the URL.
pub fn synthetic_filename(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex = hex::encode(digest);
    format!("img_{}.{}", &hex[..SYNTHETIC_HASH_LEN], SYNTHETIC_EXT)
}

/// Returns `name` with `-<n>` inserted before the extension (`a.jpg` → `a-2.jpg`).
pub fn with_suffix(name: &str, n: u32) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], n, &name[dot..]),
        _ => format!("{}-{}", name, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_from_url_path() {
        assert_eq!(
            derive_image_filename("https://img.mitemin.net/p/abc123.jpg"),
            "abc123.jpg"
        );
        assert_eq!(
            derive_image_filename("https://example.com/a%20b.png"),
            "a_b.png"
        );
    }

    #[test]
    fn empty_basename_is_synthetic_and_deterministic() {
        let a = derive_image_filename("https://mitemin.net/");
        let b = derive_image_filename("https://mitemin.net/");
        assert_eq!(a, b);
        assert!(a.starts_with("img_"));
        assert!(a.ends_with(".jpg"));
        assert_eq!(a.len(), "img_".len() + SYNTHETIC_HASH_LEN + ".jpg".len());
    }

    #[test]
    fn synthetic_differs_per_url() {
        let a = derive_image_filename("https://mitemin.net/gallery/");
        let b = derive_image_filename("https://mitemin.net/other/");
        assert_ne!(a, b);
    }

    #[test]
    fn synthetic_known_value() {
        // sha256("") = e3b0c44298fc1c14...
        assert_eq!(synthetic_filename(""), "img_e3b0c44298fc1c14.jpg");
    }

    #[test]
    fn unsanitizable_basename_falls_back() {
        let name = derive_image_filename("https://example.com/%2E%2E");
        assert!(name.starts_with("img_"));
    }

    #[test]
    fn suffix_before_extension() {
        assert_eq!(with_suffix("pic.jpg", 1), "pic-1.jpg");
        assert_eq!(with_suffix("archive.tar.gz", 2), "archive.tar-2.gz");
        assert_eq!(with_suffix("noext", 3), "noext-3");
        assert_eq!(with_suffix(".hidden", 1), ".hidden-1");
    }
}
