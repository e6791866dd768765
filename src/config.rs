use crate::cli::Args;
use crate::error::PreprocessError;
use std::path::PathBuf;

/// Default manifest name written into the output directory
pub const DEFAULT_OUTPUT_PATHFILE: &str = "images.txt";

/// Fixed tag dimensions used for border sizing and CLAHE tiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSize {
    pub width: u32,
    pub height: u32,
}

impl TagSize {
    pub const TAG: TagSize = TagSize {
        width: 64,
        height: 64,
    };
}

impl Default for TagSize {
    fn default() -> Self {
        Self::TAG
    }
}

/// Which preprocessing stages run for every image
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    pub border: bool,
    pub hist_eq: bool,
    pub threshold: bool,
    pub binary_image: bool,
    pub clip_limit: f32,
    pub tag_size: TagSize,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            border: true,
            hist_eq: false,
            threshold: false,
            binary_image: false,
            clip_limit: 2.0,
            tag_size: TagSize::TAG,
        }
    }
}

impl PreprocessOptions {
    /// Resolve cross-flag dependencies: a binary image can only come from thresholding.
    pub fn normalized(mut self) -> Self {
        if self.binary_image {
            self.threshold = true;
        }
        self
    }

    /// Reject parameters no image could be processed with
    pub fn validate(&self) -> Result<(), PreprocessError> {
        if !self.clip_limit.is_finite() || self.clip_limit <= 0.0 {
            return Err(PreprocessError::InvalidParameters(format!(
                "clip limit must be positive, got {}",
                self.clip_limit
            )));
        }
        if self.tag_size.width == 0 || self.tag_size.height == 0 {
            return Err(PreprocessError::InvalidParameters(format!(
                "tag size must be non-zero, got {}x{}",
                self.tag_size.width, self.tag_size.height
            )));
        }
        Ok(())
    }
}

/// Batch configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub pathfile: PathBuf,
    pub output_dir: PathBuf,
    pub output_pathfile: PathBuf,
    pub report: Option<PathBuf>,
    pub options: PreprocessOptions,
}

impl TryFrom<Args> for Config {
    type Error = PreprocessError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let (Some(pathfile), Some(output_dir)) = (args.pathfile, args.output_dir) else {
            return Err(PreprocessError::MissingArguments);
        };

        let output_pathfile = args
            .output_pathfile
            .unwrap_or_else(|| output_dir.join(DEFAULT_OUTPUT_PATHFILE));

        let options = PreprocessOptions {
            border: args.border,
            hist_eq: args.use_hist_eq,
            threshold: args.use_threshold,
            binary_image: args.binary_image,
            clip_limit: args.clip_limit,
            tag_size: TagSize::TAG,
        }
        .normalized();
        options.validate()?;

        Ok(Self {
            pathfile,
            output_dir,
            output_pathfile,
            report: args.report,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_binary_image_forces_threshold() {
        let args = Args::parse_from([
            "tag-preprocess",
            "paths.txt",
            "-o",
            "out",
            "--use-threshold",
            "false",
            "--binary-image",
            "true",
        ]);
        let config = Config::try_from(args).unwrap();
        assert!(config.options.threshold);
        assert!(config.options.binary_image);
    }

    #[test]
    fn test_threshold_stays_off_without_binary() {
        let options = PreprocessOptions::default().normalized();
        assert!(!options.threshold);
        assert!(options.border);
    }

    #[test]
    fn test_default_output_pathfile() {
        let args = Args::parse_from(["tag-preprocess", "paths.txt", "-o", "out"]);
        let config = Config::try_from(args).unwrap();
        assert_eq!(config.output_pathfile, PathBuf::from("out").join("images.txt"));
    }

    #[test]
    fn test_invalid_clip_limit_is_rejected_up_front() {
        for value in ["-1", "0", "NaN"] {
            let args = Args::parse_from([
                "tag-preprocess",
                "paths.txt",
                "-o",
                "out",
                "--clip-limit",
                value,
            ]);
            assert!(
                matches!(
                    Config::try_from(args),
                    Err(PreprocessError::InvalidParameters(_))
                ),
                "clip limit {} accepted",
                value
            );
        }
    }

    #[test]
    fn test_missing_output_dir() {
        let args = Args::parse_from(["tag-preprocess", "paths.txt"]);
        assert!(matches!(
            Config::try_from(args),
            Err(PreprocessError::MissingArguments)
        ));
    }
}
