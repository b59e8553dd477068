//! Core watermark removal engine.

use std::fmt;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, RgbImage};

use crate::detection::{self, DEFAULT_CANNY_HIGH, DEFAULT_CANNY_LOW, DEFAULT_THRESHOLD};
use crate::error::{Error, Result};
use crate::region::{region_mask, Region};
use crate::telea::{telea_inpaint, DEFAULT_RADIUS};

/// Extensions accepted by default when scanning a directory.
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// JPEG quality used when writing `.jpg`/`.jpeg` outputs.
const JPEG_QUALITY: u8 = 95;

/// How the watermark mask is derived for each image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Bright pixels (luminance `>= threshold`), dilated.
    Auto {
        /// Luminance threshold (0-255).
        threshold: u8,
    },
    /// The bottom-right 40% x 20% corner of every image.
    BottomRight,
    /// A fixed rectangle, clipped to each image.
    Manual(Region),
    /// Canny edges, dilated. Suited to thin text watermarks.
    Edges {
        /// Lower hysteresis threshold.
        low: f32,
        /// Upper hysteresis threshold.
        high: f32,
    },
}

impl Mode {
    /// Brightness detection with the default threshold.
    #[must_use]
    pub const fn auto() -> Self {
        Self::Auto {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Edge detection with the default Canny thresholds.
    #[must_use]
    pub const fn edges() -> Self {
        Self::Edges {
            low: DEFAULT_CANNY_LOW,
            high: DEFAULT_CANNY_HIGH,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::auto()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto { threshold } => write!(f, "auto (threshold {threshold})"),
            Self::BottomRight => write!(f, "bottom-right"),
            Self::Manual(region) => write!(f, "manual {region}"),
            Self::Edges { low, high } => write!(f, "edges (canny {low}/{high})"),
        }
    }
}

/// Options controlling watermark processing behavior.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Mask selection strategy.
    pub mode: Mode,
    /// Inpainting neighbourhood radius in pixels.
    pub radius: u32,
    /// Accepted file extensions, without the leading dot. Case-insensitive.
    pub extensions: Vec<String>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            radius: DEFAULT_RADIUS,
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded and the output was written.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
}

/// Outcome of a directory run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per accepted file, in file-name order.
    pub results: Vec<ProcessResult>,
}

impl BatchReport {
    /// Number of accepted image files found.
    #[must_use]
    pub fn found(&self) -> usize {
        self.results.len()
    }

    /// Number of files processed successfully.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Number of files that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.found() - self.succeeded()
    }
}

/// Removes watermarks according to a fixed set of [`ProcessOptions`].
///
/// Create once and reuse for every image of a batch.
#[derive(Debug, Clone, Default)]
pub struct WatermarkRemover {
    opts: ProcessOptions,
}

impl WatermarkRemover {
    /// Create a remover for the given options.
    #[must_use]
    pub fn new(opts: ProcessOptions) -> Self {
        Self { opts }
    }

    /// The options this remover was built with.
    #[must_use]
    pub fn options(&self) -> &ProcessOptions {
        &self.opts
    }

    /// Compute the inpainting mask for `image` under the configured mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRegion`] if a manual region misses the image, or
    /// [`Error::InvalidCannyThresholds`] for out-of-order edge thresholds.
    pub fn mask_for(&self, image: &RgbImage) -> Result<GrayImage> {
        let (w, h) = image.dimensions();
        match self.opts.mode {
            Mode::Auto { threshold } => Ok(detection::brightness_mask(image, threshold)),
            Mode::Edges { low, high } => detection::edge_mask(image, low, high),
            Mode::BottomRight => region_mask(w, h, Region::bottom_right(w, h)),
            Mode::Manual(region) => region_mask(w, h, region),
        }
    }

    /// Remove the watermark from `image`, returning the repaired copy.
    ///
    /// # Errors
    ///
    /// Propagates mask and inpainting errors.
    pub fn remove(&self, image: &RgbImage) -> Result<RgbImage> {
        let mask = self.mask_for(image)?;
        log::debug!(
            "{} mask covers {} of {} pixels",
            self.opts.mode,
            detection::coverage(&mask),
            mask.len()
        );
        telea_inpaint(image, &mask, self.opts.radius)
    }

    /// Process a single image file: load, mask, inpaint, save.
    ///
    /// Never fails outright; errors are reported through the returned
    /// [`ProcessResult`].
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path) -> ProcessResult {
        match self.try_process_file(input, output) {
            Ok(()) => ProcessResult {
                path: input.to_path_buf(),
                success: true,
                message: format!("saved to {}", output.display()),
            },
            Err(e) => ProcessResult {
                path: input.to_path_buf(),
                success: false,
                message: e.to_string(),
            },
        }
    }

    fn try_process_file(&self, input: &Path, output: &Path) -> Result<()> {
        let image = image::open(input)
            .map_err(|source| Error::Read {
                path: input.to_path_buf(),
                source,
            })?
            .to_rgb8();
        log::debug!(
            "loaded {} ({}x{})",
            input.display(),
            image.width(),
            image.height()
        );

        let cleaned = self.remove(&image)?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        save_image(&cleaned, output)
    }

    /// List the accepted images directly inside `dir`, sorted by path.
    ///
    /// Symlinks are followed; entries that resolve to directories are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be listed.
    pub fn find_images(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| is_supported_image(p, self.opts.extensions.as_slice()))
            .collect();
        images.sort();
        Ok(images)
    }

    /// Process all accepted images directly inside `input_dir`.
    ///
    /// Outputs keep their file name and go to `output_dir`, which is created
    /// if needed. Files are processed one at a time in file-name order; a
    /// failing file is logged and does not stop the batch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the output directory cannot be created or the
    /// input directory cannot be listed.
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        std::fs::create_dir_all(output_dir)?;

        let inputs = self.find_images(input_dir)?;
        if !inputs.is_empty() {
            log::info!("Found {} images in {}", inputs.len(), input_dir.display());
        }

        let mut report = BatchReport::default();
        for input in inputs {
            let Some(filename) = input.file_name() else {
                continue;
            };
            let result = self.process_file(&input, &output_dir.join(filename));
            if result.success {
                log::info!("[OK] {}", input.display());
            } else {
                log::warn!("[FAIL] {}: {}", input.display(), result.message);
            }
            report.results.push(result);
        }

        Ok(report)
    }
}

/// Check if a file's extension is one of `extensions`, ignoring case and a
/// leading dot.
#[must_use]
pub fn is_supported_image<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions
            .iter()
            .any(|accepted| accepted.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Save an RGB image, choosing the encoder from the path's extension.
///
/// A failed write leaves no partial file behind.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_image(img: &RgbImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Jpeg => {
            let mut buf = Vec::new();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
                .encode_image(img)?;
            std::fs::write(path, buf)?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp | ImageFormat::Tiff => {
            if let Err(e) = img.save_with_format(path, format) {
                let _ = std::fs::remove_file(path);
                return Err(e.into());
            }
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn defaults() -> Vec<String> {
        ProcessOptions::default().extensions
    }

    #[test]
    fn default_options_match_documented_values() {
        let opts = ProcessOptions::default();
        assert_eq!(opts.mode, Mode::Auto { threshold: 200 });
        assert_eq!(opts.radius, 3);
        assert_eq!(opts.extensions.len(), 6);
    }

    #[test]
    fn is_supported_image_accepts_common_formats() {
        let exts = defaults();
        for name in [
            "photo.jpg",
            "photo.JPEG",
            "photo.png",
            "photo.webp",
            "photo.bmp",
            "photo.TIFF",
        ] {
            assert!(is_supported_image(Path::new(name), exts.as_slice()), "{name}");
        }
    }

    #[test]
    fn is_supported_image_rejects_unsupported_formats() {
        let exts = defaults();
        assert!(!is_supported_image(Path::new("photo.gif"), exts.as_slice()));
        assert!(!is_supported_image(Path::new("photo.txt"), exts.as_slice()));
        assert!(!is_supported_image(Path::new("photo"), exts.as_slice()));
        assert!(!is_supported_image(Path::new("photo.tif"), exts.as_slice()));
    }

    #[test]
    fn is_supported_image_honours_custom_list() {
        let exts: &[&str] = &[".PNG"];
        assert!(is_supported_image(Path::new("a.png"), exts));
        assert!(!is_supported_image(Path::new("a.jpg"), exts));
    }

    #[test]
    fn mode_display_names_strategy() {
        assert_eq!(Mode::auto().to_string(), "auto (threshold 200)");
        assert_eq!(Mode::BottomRight.to_string(), "bottom-right");
        assert_eq!(
            Mode::Manual(Region::new(1, 2, 3, 4)).to_string(),
            "manual (1, 2) 3x4"
        );
    }

    #[test]
    fn bottom_right_mask_covers_corner() {
        let remover = WatermarkRemover::new(ProcessOptions {
            mode: Mode::BottomRight,
            ..ProcessOptions::default()
        });
        let mask = remover.mask_for(&RgbImage::new(100, 50)).unwrap();
        assert_eq!(detection::coverage(&mask), 40 * 10);
        assert_ne!(mask.get_pixel(60, 40)[0], 0);
        assert_eq!(mask.get_pixel(59, 40)[0], 0);
        assert_eq!(mask.get_pixel(60, 39)[0], 0);
    }

    #[test]
    fn manual_mask_outside_image_is_an_error() {
        let remover = WatermarkRemover::new(ProcessOptions {
            mode: Mode::Manual(Region::new(200, 200, 10, 10)),
            ..ProcessOptions::default()
        });
        let err = remover.remove(&RgbImage::new(100, 100)).unwrap_err();
        assert!(matches!(err, Error::EmptyRegion { .. }));
    }

    #[test]
    fn remove_clears_bright_logo() {
        let mut img = RgbImage::from_pixel(64, 64, Rgb([30, 60, 90]));
        for y in 50..56 {
            for x in 48..58 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let cleaned = WatermarkRemover::default().remove(&img).unwrap();
        for px in cleaned.pixels() {
            let diff = px.0.iter().zip([30u8, 60, 90]).map(|(a, b)| a.abs_diff(b));
            assert!(diff.max().unwrap_or(0) <= 2, "{px:?}");
        }
    }

    #[test]
    fn save_image_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(&RgbImage::new(4, 4), &dir.path().join("out.xyz")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn save_image_writes_every_default_format() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        for ext in DEFAULT_EXTENSIONS {
            let path = dir.path().join(format!("out.{ext}"));
            save_image(&img, &path).unwrap();
            let back = image::open(&path).unwrap();
            assert_eq!(back.width(), 8, "{ext}");
            assert_eq!(back.height(), 8, "{ext}");
        }
    }

    #[test]
    fn process_file_reports_unreadable_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.png");
        std::fs::write(&input, b"not an image").unwrap();
        let output = dir.path().join("out").join("broken.png");

        let result = WatermarkRemover::default().process_file(&input, &output);
        assert!(!result.success);
        assert!(result.message.contains("broken.png"));
        assert!(!output.exists());
    }

    #[test]
    fn inverted_canny_thresholds_fail_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("text.png");
        RgbImage::from_pixel(32, 32, Rgb([40, 40, 40]))
            .save(&input)
            .unwrap();
        let output = dir.path().join("out.png");

        let remover = WatermarkRemover::new(ProcessOptions {
            mode: Mode::Edges {
                low: 200.0,
                high: 150.0,
            },
            ..ProcessOptions::default()
        });
        let result = remover.process_file(&input, &output);
        assert!(!result.success);
        assert!(result.message.contains("Canny"), "{}", result.message);
        assert!(!output.exists());
    }

    #[test]
    fn jpeg_output_is_complete_and_decodable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let img = RgbImage::from_pixel(16, 12, Rgb([120, 130, 140]));
        save_image(&img, &path).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (16, 12));
        let px = back.get_pixel(8, 6);
        assert!(px.0.iter().zip([120u8, 130, 140]).all(|(a, b)| a.abs_diff(b) <= 3));
    }

    #[test]
    fn failed_save_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(save_image(&RgbImage::new(4, 4), &path).is_err());
        assert!(!path.exists());

        let path = dir.path().join("out.gif");
        assert!(save_image(&RgbImage::new(4, 4), &path).is_err());
        assert!(!path.exists());
    }
}
