use clap::Parser;
use std::path::PathBuf;

use satscene::types::OutputFormat;
use satscene::{BitDepthArg, InputFormat, StretchStrategy};

#[derive(Parser)]
#[command(name = "satscene", version, about = "SATSCENE CLI")]
pub struct CliArgs {
    /// Input scene directory (single scene mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory containing scene subdirectories (animation mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output filename (single scene mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory for animation frames (animation mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output format (tiff or jpeg)
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::JPEG)]
    pub format: OutputFormat,

    /// Input format (only scene directories supported currently)
    #[arg(long, value_enum, default_value_t = InputFormat::SceneDir)]
    pub input_format: InputFormat,

    /// Output bit depth (8 or 16)
    #[arg(long, value_enum, default_value_t = BitDepthArg::U8)]
    pub bit_depth: BitDepthArg,

    /// Channel to render, by configured name (e.g. C02)
    #[arg(long)]
    pub channel: Option<String>,

    /// Channel to render, by wavelength in micrometers (e.g. 0.485)
    #[arg(long)]
    pub wavelength: Option<f64>,

    /// Three comma-separated channel names for an RGB composite
    /// (e.g. C02,C03,C01)
    #[arg(long)]
    pub composite: Option<String>,

    /// Stretch strategy (linear, robust, equalized)
    #[arg(long, value_enum, default_value_t = StretchStrategy::Robust)]
    pub stretch: StretchStrategy,

    /// Image size for scaling. Options:
    /// - Custom: any positive integer (e.g. 1024)
    /// - Original: "original" (no scaling)
    #[arg(long, default_value = "original")]
    pub size: String,

    /// Add padding to make square images
    #[arg(long, default_value_t = false)]
    pub pad: bool,

    /// Graticule line spacing in degrees
    #[arg(long)]
    pub graticule: Option<f64>,

    /// JSON file with overlay polylines (coastlines, borders)
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    /// Chunk granularity in rows for the force engine
    #[arg(long)]
    pub chunk_rows: Option<usize>,

    /// List the channels a scene offers and exit
    #[arg(long, default_value_t = false)]
    pub list: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
