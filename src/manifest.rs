//! Path lists consumed and produced by a batch run

use crate::error::PreprocessError;
use image::GrayImage;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Suffix inserted before the extension of every written image
pub const OUTPUT_SUFFIX: &str = "_wb";

/// Source image entry read from the input pathfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub path: PathBuf,
}

impl ImageDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every non-blank line of `pathfile` as an image path
    pub fn from_pathfile(pathfile: &Path) -> Result<Vec<Self>, PreprocessError> {
        let contents = fs::read_to_string(pathfile).map_err(|source| {
            PreprocessError::ManifestRead {
                path: pathfile.to_path_buf(),
                source,
            }
        })?;

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Self::new)
            .collect())
    }

    /// Load pixel data as 8-bit grayscale
    pub fn load(&self) -> Result<GrayImage, PreprocessError> {
        let image = image::open(&self.path).map_err(|source| PreprocessError::ImageLoad {
            path: self.path.clone(),
            source,
        })?;
        Ok(image.to_luma8())
    }

    /// `<output_dir>/<stem>_wb<ext>`
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        let file_name = self.path.file_name().map(Path::new).unwrap_or(self.path.as_path());
        output_dir.join(with_suffix(file_name))
    }
}

/// Insert [`OUTPUT_SUFFIX`] in front of the file extension
pub fn with_suffix(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{OUTPUT_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{OUTPUT_SUFFIX}"),
    };
    path.with_file_name(name)
}

/// Output paths in processing order
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    paths: Vec<PathBuf>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Write one path per line
    pub fn write_to(&self, pathfile: &Path) -> Result<(), PreprocessError> {
        let to_error = |source| PreprocessError::ManifestWrite {
            path: pathfile.to_path_buf(),
            source,
        };

        let file = fs::File::create(pathfile).map_err(to_error)?;
        let mut writer = BufWriter::new(file);
        for path in &self.paths {
            writeln!(writer, "{}", path.display()).map_err(to_error)?;
        }
        writer.flush().map_err(to_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_goes_before_extension() {
        assert_eq!(with_suffix(Path::new("name.ext")), PathBuf::from("name_wb.ext"));
        assert_eq!(
            with_suffix(Path::new("dir/cam0.tar.png")),
            PathBuf::from("dir/cam0.tar_wb.png")
        );
        assert_eq!(with_suffix(Path::new("noext")), PathBuf::from("noext_wb"));
    }

    #[test]
    fn test_output_path_uses_only_file_name() {
        let desc = ImageDescriptor::new("/data/raw/cam1/frame.jpeg");
        assert_eq!(
            desc.output_path(Path::new("/out")),
            PathBuf::from("/out/frame_wb.jpeg")
        );
    }

    #[test]
    fn test_pathfile_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let pathfile = dir.path().join("paths.txt");
        fs::write(&pathfile, "a.png\n\n  b.png  \n\nc.png").unwrap();

        let descs = ImageDescriptor::from_pathfile(&pathfile).unwrap();
        let paths: Vec<_> = descs.iter().map(|d| d.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.png"),
                PathBuf::from("b.png"),
                PathBuf::from("c.png")
            ]
        );
    }

    #[test]
    fn test_missing_pathfile_is_reported() {
        let result = ImageDescriptor::from_pathfile(Path::new("/nonexistent/paths.txt"));
        assert!(matches!(result, Err(PreprocessError::ManifestRead { .. })));
    }

    #[test]
    fn test_manifest_writes_one_path_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("images.txt");
        let mut manifest = Manifest::new();
        manifest.push(PathBuf::from("out/a_wb.png"));
        manifest.push(PathBuf::from("out/b_wb.png"));
        assert_eq!(manifest.paths()[1], PathBuf::from("out/b_wb.png"));
        manifest.write_to(&out).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written, "out/a_wb.png\nout/b_wb.png\n");
    }
}
