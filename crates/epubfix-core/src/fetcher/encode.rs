//! Decode downloaded bytes and re-encode them to the target file.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat};

use super::FetchError;

/// Output format: the target extension when writable, else the source format, else PNG.
fn target_format(bytes: &[u8], path: &Path) -> ImageFormat {
    ImageFormat::from_path(path)
        .ok()
        .filter(|f| f.writing_enabled())
        .or_else(|| image::guess_format(bytes).ok().filter(|f| f.writing_enabled()))
        .unwrap_or(ImageFormat::Png)
}

/// Decodes `bytes` as an image and writes it re-encoded to `path`.
///
/// Encoding happens in memory first so a failed attempt never leaves a partial file.
pub fn reencode_to(bytes: &[u8], path: &Path) -> Result<(), FetchError> {
    let img = image::load_from_memory(bytes)?;
    let format = target_format(bytes, path);
    let img = match format {
        // JPEG has no alpha channel.
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)?;
    fs::write(path, buf.into_inner())?;
    Ok(())
}
