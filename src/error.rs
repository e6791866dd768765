use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("No pathfile or output_dir are given")]
    MissingArguments,

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Failed to read pathfile {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write pathfile {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fail to load image : {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Fail to write image : {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write report {path}: {reason}")]
    Report { path: PathBuf, reason: String },
}

impl PreprocessError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            PreprocessError::MissingArguments => 0,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_arguments_is_not_a_failure() {
        assert_eq!(PreprocessError::MissingArguments.exit_code(), 0);
    }

    #[test]
    fn test_write_failure_exits_nonzero() {
        let err = PreprocessError::ImageWrite {
            path: PathBuf::from("out/a_wb.png"),
            source: image::ImageError::IoError(std::io::Error::other("disk full")),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("out/a_wb.png"));
    }
}
