//! Batch-remove watermarks from images by masking and inpainting.
//!
//! A mask of watermark pixels is chosen by one of four strategies and the
//! masked pixels are then reconstructed with Telea fast-marching inpainting:
//!
//! - **auto**: bright pixels (luminance at or above a threshold), dilated
//! - **bottom-right**: the bottom-right 40% x 20% corner
//! - **manual**: a fixed rectangle, clipped to each image
//! - **edges**: dilated Canny edges, for thin text overlays
//!
//! Pixels outside the mask are never modified.
//!
//! # Quick Start
//!
//! ```no_run
//! use watermark_inpaint::{Mode, ProcessOptions, Region, WatermarkRemover};
//!
//! let remover = WatermarkRemover::new(ProcessOptions {
//!     mode: Mode::Manual(Region::new(100, 50, 200, 80)),
//!     ..ProcessOptions::default()
//! });
//! let img = image::open("photo.jpg").unwrap().to_rgb8();
//! let cleaned = remover.remove(&img).unwrap();
//! cleaned.save("cleaned.jpg").unwrap();
//! ```
//!
//! # Batch processing
//!
//! ```no_run
//! use std::path::Path;
//! use watermark_inpaint::{ProcessOptions, WatermarkRemover};
//!
//! let remover = WatermarkRemover::new(ProcessOptions::default());
//! let report = remover
//!     .process_directory(Path::new("input"), Path::new("output"))
//!     .unwrap();
//! println!("{}/{} cleaned", report.succeeded(), report.found());
//! ```

#![deny(missing_docs)]

pub mod detection;
mod engine;
pub mod error;
pub mod region;
pub mod telea;

pub use engine::{
    is_supported_image, save_image, BatchReport, Mode, ProcessOptions, ProcessResult,
    WatermarkRemover, DEFAULT_EXTENSIONS,
};
pub use error::{Error, Result};
pub use region::Region;
pub use telea::telea_inpaint;
