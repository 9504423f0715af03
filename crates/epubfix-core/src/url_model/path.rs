//! Filename extraction from URL path.

/// Extracts the last path segment from a URL for use as a filename, percent-decoded.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
/// A trailing slash counts as an empty basename (`/gallery/` yields `None`).
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.last()?;
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(percent_decode(segment))
}

/// Lossy percent-decode of a single path segment; malformed escapes are kept verbatim.
pub(super) fn percent_decode(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(b);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
