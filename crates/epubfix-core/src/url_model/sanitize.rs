//! Filename sanitization for images stored inside the archive.

/// Characters that break either the filesystem or the relative `src` reference.
fn is_unsafe(c: char) -> bool {
    matches!(c, '\0' | '/' | '\\' | '#' | '?' | '%' | '"') || c.is_control() || c.is_whitespace()
}

/// Sanitizes a candidate image filename.
///
/// - Replaces NUL, `/`, `\`, control characters, whitespace and the URI
///   delimiters `#`, `?`, `%` (plus `"`) with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores
/// - Limits length to 255 bytes (Linux NAME_MAX)
pub fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if is_unsafe(c) { '_' } else { c };
        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
