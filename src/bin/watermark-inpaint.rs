use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use log::LevelFilter;

use watermark_inpaint::detection::check_canny_thresholds;
use watermark_inpaint::{
    Mode, ProcessOptions, Region, WatermarkRemover, DEFAULT_EXTENSIONS,
};

/// Mask selection strategy as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Detect bright pixels above --threshold
    Auto,
    /// Bottom-right 40% x 20% corner
    BottomRight,
    /// Rectangle given by --region
    Manual,
    /// Canny edges, for thin text watermarks
    Edges,
}

#[derive(Parser)]
#[command(
    name = "watermark-inpaint",
    about = "Batch-remove watermarks from images with Telea inpainting",
    version,
    after_help = "Examples:\n  \
                  watermark-inpaint -i ./input -o ./output\n  \
                  watermark-inpaint -i ./input -o ./output -m bottom-right\n  \
                  watermark-inpaint -i ./input -o ./output -m manual -r 100 50 200 80\n  \
                  watermark-inpaint -i ./input -o ./output -t 220"
)]
struct Cli {
    /// Input directory containing the images
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// Output directory (created if missing)
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// How the watermark is located
    #[arg(short, long, value_enum, default_value_t = ModeArg::Auto)]
    mode: ModeArg,

    /// Watermark rectangle for manual mode
    #[arg(
        short,
        long,
        num_args = 4,
        value_names = ["X", "Y", "W", "H"],
        required_if_eq("mode", "manual")
    )]
    region: Option<Vec<u32>>,

    /// Brightness threshold for auto mode (0-255)
    #[arg(short, long, default_value_t = 200)]
    threshold: u8,

    /// Inpainting radius in pixels (1-64)
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=64))]
    radius: u32,

    /// Lower Canny threshold for edges mode
    #[arg(long, default_value_t = 50.0)]
    canny_low: f32,

    /// Upper Canny threshold for edges mode
    #[arg(long, default_value_t = 150.0)]
    canny_high: f32,

    /// Comma-separated list of accepted extensions [default: jpg,jpeg,png,bmp,tiff,webp]
    #[arg(short, long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Checks that need more than one argument or the filesystem.
    fn validate(&self) -> Result<(), clap::Error> {
        if !self.input.is_dir() {
            return Err(Self::command().error(
                ErrorKind::ValueValidation,
                format!("input directory does not exist: {}", self.input.display()),
            ));
        }
        if check_canny_thresholds(self.canny_low, self.canny_high).is_err() {
            return Err(Self::command().error(
                ErrorKind::ValueValidation,
                format!(
                    "--canny-low ({}) must not exceed --canny-high ({})",
                    self.canny_low, self.canny_high
                ),
            ));
        }
        Ok(())
    }

    fn region(&self) -> Option<Region> {
        match self.region.as_deref() {
            Some(&[x, y, w, h]) => Some(Region::new(x, y, w, h)),
            _ => None,
        }
    }

    fn options(&self) -> ProcessOptions {
        let mode = match self.mode {
            ModeArg::Auto => Mode::Auto {
                threshold: self.threshold,
            },
            ModeArg::BottomRight => Mode::BottomRight,
            ModeArg::Manual => match self.region() {
                Some(region) => Mode::Manual(region),
                None => Self::command()
                    .error(ErrorKind::MissingRequiredArgument, "manual mode requires --region X Y W H")
                    .exit(),
            },
            ModeArg::Edges => Mode::Edges {
                low: self.canny_low,
                high: self.canny_high,
            },
        };

        let extensions = self.extensions.clone().unwrap_or_else(|| {
            DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
        });

        ProcessOptions {
            mode,
            radius: self.radius,
            extensions,
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = cli.validate() {
        e.exit();
    }

    if cli.region.is_some() && cli.mode != ModeArg::Manual {
        log::warn!("--region is only used in manual mode, ignoring it");
    }

    let remover = WatermarkRemover::new(cli.options());
    log::info!("Mode: {}", remover.options().mode);

    let report = match remover.process_directory(&cli.input, &cli.output) {
        Ok(report) => report,
        Err(e) => {
            log::error!("Batch failed: {e}");
            process::exit(1);
        }
    };

    if report.found() == 0 {
        log::warn!("No images found in {}", cli.input.display());
        return;
    }

    log::info!(
        "[Summary] Processed {}/{} images",
        report.succeeded(),
        report.found()
    );

    if report.failed() > 0 {
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("watermark-inpaint").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_auto_mode() {
        let cli = parse(&["-i", "in", "-o", "out"]).unwrap();
        let opts = cli.options();
        assert_eq!(opts.mode, Mode::Auto { threshold: 200 });
        assert_eq!(opts.radius, 3);
        assert_eq!(opts.extensions.len(), DEFAULT_EXTENSIONS.len());
    }

    #[test]
    fn manual_mode_requires_region() {
        let err = parse(&["-i", "in", "-o", "out", "-m", "manual"])
            .err()
            .expect("manual without region must be rejected");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn manual_mode_takes_four_values() {
        let cli = parse(&[
            "-i", "in", "-o", "out", "-m", "manual", "-r", "100", "50", "200", "80",
        ])
        .unwrap();
        assert_eq!(
            cli.options().mode,
            Mode::Manual(Region::new(100, 50, 200, 80))
        );
    }

    #[test]
    fn region_with_three_values_is_rejected() {
        assert!(parse(&["-i", "in", "-o", "out", "-m", "manual", "-r", "1", "2", "3"]).is_err());
    }

    #[test]
    fn bottom_right_and_edges_modes_parse() {
        let cli = parse(&["-i", "in", "-o", "out", "-m", "bottom-right"]).unwrap();
        assert_eq!(cli.options().mode, Mode::BottomRight);

        let cli = parse(&["-i", "in", "-o", "out", "-m", "edges", "--canny-low", "20"]).unwrap();
        assert_eq!(cli.options().mode, Mode::Edges { low: 20.0, high: 150.0 });
    }

    #[test]
    fn threshold_is_limited_to_a_byte() {
        let cli = parse(&["-i", "in", "-o", "out", "-t", "220"]).unwrap();
        assert_eq!(cli.options().mode, Mode::Auto { threshold: 220 });
        assert!(parse(&["-i", "in", "-o", "out", "-t", "256"]).is_err());
    }

    #[test]
    fn extensions_split_on_commas() {
        let cli = parse(&["-i", "in", "-o", "out", "-e", "png,JPG"]).unwrap();
        assert_eq!(cli.options().extensions, vec!["png", "JPG"]);
    }

    #[test]
    fn input_and_output_are_required() {
        assert!(parse(&["-o", "out"]).is_err());
        assert!(parse(&["-i", "in"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(parse(&["-i", "in", "-o", "out", "-v", "-q"]).is_err());
    }

    #[test]
    fn radius_is_bounded() {
        assert!(parse(&["-i", "in", "-o", "out", "--radius", "0"]).is_err());
        assert!(parse(&["-i", "in", "-o", "out", "--radius", "65"]).is_err());
        let cli = parse(&["-i", "in", "-o", "out", "--radius", "64"]).unwrap();
        assert_eq!(cli.options().radius, 64);
    }

    #[test]
    fn missing_input_directory_fails_validation() {
        let cli = parse(&["-i", "/definitely/not/here", "-o", "out"]).unwrap();
        let err = cli.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn inverted_canny_thresholds_fail_validation() {
        let input = tempfile::tempdir().unwrap();
        let dir = input.path().to_str().unwrap();
        let cli = parse(&["-i", dir, "-o", "out", "-m", "edges", "--canny-low", "200"]).unwrap();
        let err = cli.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let cli = parse(&["-i", dir, "-o", "out", "-m", "edges"]).unwrap();
        assert!(cli.validate().is_ok());
    }
}
