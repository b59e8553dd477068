//! Rectangular watermark regions and their masks.

use std::fmt;

use image::{GrayImage, Luma};

use crate::error::{Error, Result};

/// Mask value marking a pixel for inpainting.
pub const MASK_ON: u8 = 255;

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// Create a region from its top-left corner and size.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The bottom-right corner heuristic: origin at 60% of the width and 80%
    /// of the height, extending to the image edges.
    ///
    /// A 1000x1000 image yields `(600, 800, 400, 200)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // w * 3 / 5 <= w
    pub fn bottom_right(img_w: u32, img_h: u32) -> Self {
        let x = (u64::from(img_w) * 3 / 5) as u32;
        let y = (u64::from(img_h) * 4 / 5) as u32;
        Self::new(x, y, img_w - x, img_h - y)
    }

    /// Clip the region to a `img_w` x `img_h` image.
    ///
    /// Returns `None` when nothing of the region remains inside the image.
    #[must_use]
    pub fn clamp_to(&self, img_w: u32, img_h: u32) -> Option<Self> {
        if self.x >= img_w || self.y >= img_h {
            return None;
        }
        let x2 = self.x.saturating_add(self.width).min(img_w);
        let y2 = self.y.saturating_add(self.height).min(img_h);
        let clipped = Self::new(self.x, self.y, x2 - self.x, y2 - self.y);
        (!clipped.is_empty()).then_some(clipped)
    }

    /// Whether the region covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the pixel `(px, py)` lies inside the region.
    #[must_use]
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x
            && py >= self.y
            && u64::from(px) < u64::from(self.x) + u64::from(self.width)
            && u64::from(py) < u64::from(self.y) + u64::from(self.height)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Build a `img_w` x `img_h` mask that is set inside `region` only.
///
/// The region is clipped to the image first.
///
/// # Errors
///
/// Returns [`Error::EmptyRegion`] if the region does not overlap the image.
pub fn region_mask(img_w: u32, img_h: u32, region: Region) -> Result<GrayImage> {
    let clipped = region.clamp_to(img_w, img_h).ok_or(Error::EmptyRegion {
        region,
        width: img_w,
        height: img_h,
    })?;
    if clipped != region {
        log::warn!("region {region} clipped to {clipped} for {img_w}x{img_h} image");
    }

    let mut mask = GrayImage::new(img_w, img_h);
    for y in clipped.y..clipped.y + clipped.height {
        for x in clipped.x..clipped.x + clipped.width {
            mask.put_pixel(x, y, Luma([MASK_ON]));
        }
    }
    Ok(mask)
}
