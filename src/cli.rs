use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "tag-preprocess")]
#[command(about = "Add borders, local histogram equalization and adaptive thresholding to a batch of images")]
#[command(override_usage = "tag-preprocess [OPTIONS] <PATHFILE>\n    where PATHFILE contains paths to images.")]
#[command(version)]
pub struct Args {
    /// File with paths, one image per line
    pub pathfile: Option<PathBuf>,

    /// Write images to this directory
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Write the output pathfile here. Default is <output_dir>/images.txt
    #[arg(long)]
    pub output_pathfile: Option<PathBuf>,

    /// Add a border around the image
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub border: bool,

    /// Apply local histogram equalization (CLAHE) to samples
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub use_hist_eq: bool,

    /// Apply adaptive thresholding to samples
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub use_threshold: bool,

    /// Save binary image from thresholding (implies --use-threshold true)
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub binary_image: bool,

    /// Contrast limit for local histogram equalization
    #[arg(
        long,
        env = "TAG_PREPROCESS_CLIP_LIMIT",
        default_value_t = 2.0,
        allow_negative_numbers = true
    )]
    pub clip_limit: f32,

    /// Write a JSON report with per-image step timings
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}
