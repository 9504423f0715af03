//! Per-attempt image fetch error.

use thiserror::Error;

/// Error from a single fetch attempt (transport, HTTP status, decode or write).
/// Every variant is retried; after the last attempt the placeholder is left alone.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Body could not be decoded or re-encoded as an image.
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    /// Writing the image file failed.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}
