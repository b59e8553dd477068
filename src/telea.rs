//! Telea fast-marching inpainting.
//!
//! The fill itself is delegated to the `inpaint` crate. This module checks
//! the inputs, bounds the radius and restores every pixel outside the mask so
//! the result differs from the source only where the mask is set.

use image::{GrayImage, RgbImage};
use inpaint::ImageInpaint;

use crate::detection::coverage;
use crate::error::{Error, Result};

/// Default neighbourhood radius used when filling a pixel.
pub const DEFAULT_RADIUS: u32 = 3;
/// Largest accepted neighbourhood radius; larger values are clamped.
pub const MAX_RADIUS: u32 = 64;

/// Inpaint the pixels of `image` selected by `mask` (non-zero = fill).
///
/// Returns a new image; pixels where the mask is zero are copied unchanged.
/// The radius is clamped to `1..=MAX_RADIUS`. A fully masked image has no
/// known pixels to propagate from and is returned as is.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if the mask and image sizes differ,
/// or [`Error::Inpaint`] if the fill fails.
pub fn telea_inpaint(image: &RgbImage, mask: &GrayImage, radius: u32) -> Result<RgbImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(Error::DimensionMismatch {
            image: image.dimensions(),
            mask: mask.dimensions(),
        });
    }

    let masked = coverage(mask);
    if masked == 0 {
        return Ok(image.clone());
    }
    if masked == mask.len() {
        log::debug!("every pixel is masked, nothing to propagate from");
        return Ok(image.clone());
    }

    let radius = i32::try_from(radius.clamp(1, MAX_RADIUS)).unwrap_or(1);
    let mut out = image.clone();
    out.telea_inpaint(mask, radius)
        .map_err(|e| Error::Inpaint(e.to_string()))?;

    for ((dst, src), m) in out.pixels_mut().zip(image.pixels()).zip(mask.pixels()) {
        if m[0] == 0 {
            *dst = *src;
        }
    }

    Ok(out)
}
