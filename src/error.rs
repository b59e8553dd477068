//! Error types for the watermark-inpaint crate.

use std::path::PathBuf;

use crate::region::Region;

/// Errors that can occur while detecting masks, inpainting or doing file I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source image could not be opened or decoded.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying decoder error.
        source: image::ImageError,
    },

    /// The mask does not have the same dimensions as the image.
    #[error(
        "mask is {}x{} but image is {}x{}",
        mask.0, mask.1, image.0, image.1
    )]
    DimensionMismatch {
        /// Image dimensions `(width, height)`.
        image: (u32, u32),
        /// Mask dimensions `(width, height)`.
        mask: (u32, u32),
    },

    /// The requested region has no overlap with the image.
    #[error("region {region} lies outside the {width}x{height} image")]
    EmptyRegion {
        /// The region as requested.
        region: Region,
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// Canny hysteresis thresholds are out of order or not numbers.
    #[error("invalid Canny thresholds: low {low} must not exceed high {high}")]
    InvalidCannyThresholds {
        /// Lower hysteresis threshold.
        low: f32,
        /// Upper hysteresis threshold.
        high: f32,
    },

    /// The inpainting backend rejected the input.
    #[error("inpainting failed: {0}")]
    Inpaint(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output format has no encoder.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred while encoding or saving an image.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
