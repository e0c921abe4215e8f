//! Error types for reference image processing.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while preparing a reference image.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to fetch reference image: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Reference fetch returned HTTP {0}")]
    FetchStatus(u16),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Reference image too small: {width}x{height}")]
    TooSmall { width: u32, height: u32 },
}
