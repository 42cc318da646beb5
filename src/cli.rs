// imgshrink/src/cli.rs
use crate::core::{ConvertConfig, ResampleFilter, Result};
use crate::processors::STANDARD_EXTENSIONS;
use clap::Parser;
use std::path::PathBuf;

fn about() -> String {
    let types: Vec<&str> = STANDARD_EXTENSIONS
        .iter()
        .map(|ext| ext.trim_start_matches('.'))
        .collect();
    format!("Batch image conversion. Filetype: {}.", types.join(", "))
}

#[derive(Parser, Debug)]
#[command(name = "imgshrink", version, about = about())]
pub struct Cli {
    /// Root folder to convert (recursively)
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Pixel density in pixels per inch (dpi)
    #[arg(short, long, default_value_t = 72, value_name = "1-1000",
          value_parser = clap::value_parser!(u16).range(1..=1000),
          help_heading = "Image conversion properties")]
    pub dpi: u16,

    /// Max resolution of the long side in pixels (downscaling only)
    #[arg(short, long, default_value_t = 1000, value_name = "1-10000",
          value_parser = clap::value_parser!(u32).range(1..=10_000),
          help_heading = "Image conversion properties")]
    pub size: u32,

    /// Downscaling filter: 0 = Nearest, 1 = Bilinear, 2 = Bicubic, 3 = Lanczos3
    #[arg(short, long, default_value_t = 0, value_name = "0-3",
          value_parser = clap::value_parser!(u8).range(0..=3),
          help_heading = "Image conversion properties")]
    pub filter: u8,

    /// Convert all images to RGB (RGBA for PNG) color space
    #[arg(long = "colorspace", visible_alias = "cs", overrides_with = "no_colorspace",
          help_heading = "Image conversion properties")]
    colorspace: bool,

    /// Keep each image's own color space (default)
    #[arg(long = "no-colorspace", overrides_with = "colorspace",
          help_heading = "Image conversion properties")]
    no_colorspace: bool,

    /// Quality of output images (values above 95 should be avoided)
    #[arg(short, long, default_value_t = 80, value_name = "1-100",
          value_parser = clap::value_parser!(u8).range(1..=100),
          help_heading = "Image conversion properties")]
    pub quality: u8,

    /// Compress PNG output losslessly (default: on)
    #[arg(long = "optimize", overrides_with = "no_optimize",
          help_heading = "Image conversion properties")]
    optimize: bool,

    /// Skip PNG optimization
    #[arg(long = "no-optimize", overrides_with = "optimize",
          help_heading = "Image conversion properties")]
    no_optimize: bool,

    /// Ring the terminal bell when finished (default: on)
    #[arg(long = "alert", overrides_with = "no_alert", help_heading = "Other options")]
    alert: bool,

    /// Finish silently
    #[arg(long = "no-alert", overrides_with = "alert", help_heading = "Other options")]
    no_alert: bool,

    /// Wait for Enter before exiting (default: on)
    #[arg(long = "wait", overrides_with = "no_wait", help_heading = "Other options")]
    wait: bool,

    /// Exit as soon as the summary is printed
    #[arg(long = "no-wait", overrides_with = "wait", help_heading = "Other options")]
    no_wait: bool,

    /// Start without asking for confirmation
    #[arg(short, long, help_heading = "Other options")]
    pub yes: bool,

    /// Hide the progress bar
    #[arg(long, help_heading = "Other options")]
    pub no_progress: bool,

    /// Enable debug logging
    #[arg(short, long, help_heading = "Other options")]
    pub verbose: bool,
}

impl Cli {
    pub fn colorspace(&self) -> bool {
        self.colorspace && !self.no_colorspace
    }

    pub fn optimize(&self) -> bool {
        !self.no_optimize
    }

    pub fn alert(&self) -> bool {
        !self.no_alert
    }

    pub fn wait(&self) -> bool {
        !self.no_wait
    }

    pub fn filter(&self) -> Result<ResampleFilter> {
        ResampleFilter::try_from(self.filter)
    }

    pub fn convert_config(&self) -> Result<ConvertConfig> {
        let config = ConvertConfig {
            max_dimension: self.size,
            dpi: self.dpi,
            filter: self.filter()?,
            quality: self.quality,
            optimize: self.optimize(),
            normalize_color_space: self.colorspace(),
        };
        config.validate()?;
        Ok(config)
    }
}
