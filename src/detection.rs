//! Watermark mask detection.
//!
//! Two detectors produce binary masks (0 or 255) of the same size as the
//! source image:
//! 1. **Brightness**: luminance thresholding followed by a 5x5 dilation, for
//!    light overlays such as white logos.
//! 2. **Edges**: Canny edges followed by a 3x3 dilation, for thin text.

use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::dilate;

use crate::error::{Error, Result};
use crate::region::MASK_ON;

/// Default luminance threshold for brightness detection.
pub const DEFAULT_THRESHOLD: u8 = 200;
/// Default Canny hysteresis thresholds for edge detection.
pub const DEFAULT_CANNY_LOW: f32 = 50.0;
/// See [`DEFAULT_CANNY_LOW`].
pub const DEFAULT_CANNY_HIGH: f32 = 150.0;

/// Half-size of the brightness dilation element (5x5).
const BRIGHT_DILATE_RADIUS: u8 = 2;
/// Half-size of the edge dilation element (3x3).
const EDGE_DILATE_RADIUS: u8 = 1;
/// Both detectors dilate twice.
const DILATE_ITERATIONS: usize = 2;

/// Convert an RGB image to single-channel luminance.
///
/// Uses luminance formula: `0.299*R + 0.587*G + 0.114*B`, rounded.
#[must_use]
pub fn luminance(img: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(img.width(), img.height());
    for (src, dst) in img.pixels().zip(gray.pixels_mut()) {
        let lum =
            0.299 * f32::from(src[0]) + 0.587 * f32::from(src[1]) + 0.114 * f32::from(src[2]);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            *dst = Luma([lum.round().clamp(0.0, 255.0) as u8]);
        }
    }
    gray
}

/// Binarize a grayscale image: pixels `>= threshold` become 255, others 0.
#[must_use]
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = gray.clone();
    for px in out.pixels_mut() {
        px[0] = if px[0] >= threshold { MASK_ON } else { 0 };
    }
    out
}

/// Dilate a binary mask with a `(2r+1)` square element, `iterations` times.
fn dilate_square(mask: &GrayImage, radius: u8, iterations: usize) -> GrayImage {
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = dilate(&out, Norm::LInf, radius);
    }
    out
}

/// Detect bright watermark pixels.
///
/// Thresholds luminance at `threshold` and dilates the result twice with a
/// 5x5 element so neighbouring bright pixels merge into solid regions.
#[must_use]
pub fn brightness_mask(img: &RgbImage, threshold: u8) -> GrayImage {
    let bright = binarize(&luminance(img), threshold);
    dilate_square(&bright, BRIGHT_DILATE_RADIUS, DILATE_ITERATIONS)
}

/// Check that Canny hysteresis thresholds are ordered (`low <= high`).
///
/// # Errors
///
/// Returns [`Error::InvalidCannyThresholds`] if `low > high` or either is NaN.
pub fn check_canny_thresholds(low: f32, high: f32) -> Result<()> {
    if low <= high {
        Ok(())
    } else {
        Err(Error::InvalidCannyThresholds { low, high })
    }
}

/// Detect text-like watermark strokes.
///
/// Runs Canny with the given hysteresis thresholds and dilates the edges
/// twice with a 3x3 element.
///
/// # Errors
///
/// Returns [`Error::InvalidCannyThresholds`] if the thresholds are out of order.
pub fn edge_mask(img: &RgbImage, low: f32, high: f32) -> Result<GrayImage> {
    check_canny_thresholds(low, high)?;
    let edges = canny(&luminance(img), low, high);
    Ok(dilate_square(&edges, EDGE_DILATE_RADIUS, DILATE_ITERATIONS))
}

/// Number of pixels set in a mask.
#[must_use]
pub fn coverage(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] != 0).count()
}
