//! Sequential batch run: load, preprocess and write every image of a pathfile

use crate::config::Config;
use crate::error::PreprocessError;
use crate::manifest::{ImageDescriptor, Manifest};
use crate::preprocessing::{Pipeline, StepTiming};
use image::GrayImage;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Pixel buffer owned for the duration of one image's processing
pub struct Image {
    pub descriptor: ImageDescriptor,
    pub pixels: GrayImage,
}

impl Image {
    pub fn load(descriptor: ImageDescriptor) -> Result<Self, PreprocessError> {
        let pixels = descriptor.load()?;
        Ok(Self { descriptor, pixels })
    }

    pub fn write(&self, path: &Path) -> Result<(), PreprocessError> {
        self.pixels
            .save(path)
            .map_err(|source| PreprocessError::ImageWrite {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Per-image entry of the run report
#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub total_time_ms: u64,
    pub steps: Vec<StepTiming>,
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub output_manifest: PathBuf,
    pub images: Vec<ImageReport>,
    pub aborted: bool,
    pub total_time_ms: u64,
}

/// Process every image listed in `config.pathfile`
///
/// Stops at the first image that cannot be loaded or written. The output
/// manifest is written in either case and lists only the images written
/// before the failure.
pub fn run(config: &Config) -> Result<BatchReport, PreprocessError> {
    let start = Instant::now();
    config.options.validate()?;
    let descriptors = ImageDescriptor::from_pathfile(&config.pathfile)?;

    fs::create_dir_all(&config.output_dir).map_err(|source| PreprocessError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let pipeline = Pipeline::new(config.options.clone());
    let total = descriptors.len();
    tracing::info!(
        "Processing {} images from {}",
        total,
        config.pathfile.display()
    );

    let mut manifest = Manifest::new();
    let mut images = Vec::with_capacity(total);
    let mut failure = None;

    for (i, descriptor) in descriptors.into_iter().enumerate() {
        match process_image(&pipeline, descriptor, &config.output_dir) {
            Ok(report) => {
                tracing::info!("[{}/{}] {}", i + 1, total, report.output.display());
                manifest.push(report.output.clone());
                images.push(report);
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    let written = manifest.write_to(&config.output_pathfile);

    let report = BatchReport {
        output_manifest: config.output_pathfile.clone(),
        images,
        aborted: failure.is_some(),
        total_time_ms: start.elapsed().as_millis() as u64,
    };
    if let Some(path) = &config.report {
        if let Err(err) = write_report(&report, path) {
            tracing::warn!("{}", err);
        }
    }

    if let Some(err) = failure {
        if let Err(manifest_err) = written {
            tracing::error!("{}", manifest_err);
        }
        tracing::warn!(
            "Batch aborted after {} of {} images",
            manifest.len(),
            total
        );
        return Err(err);
    }
    written?;

    tracing::info!(
        "Processed {} images. Saved new images paths to: {}",
        manifest.len(),
        config.output_pathfile.display()
    );
    Ok(report)
}

fn process_image(
    pipeline: &Pipeline,
    descriptor: ImageDescriptor,
    output_dir: &Path,
) -> Result<ImageReport, PreprocessError> {
    let output = descriptor.output_path(output_dir);
    let mut image = Image::load(descriptor)?;

    let result = pipeline.process(image.pixels)?;
    image.pixels = result.image;
    image.write(&output)?;

    Ok(ImageReport {
        source: image.descriptor.path,
        output,
        total_time_ms: result.total_time_ms,
        steps: result.steps,
    })
}

fn write_report(report: &BatchReport, path: &Path) -> Result<(), PreprocessError> {
    let to_error = |reason: String| PreprocessError::Report {
        path: path.to_path_buf(),
        reason,
    };
    let file = fs::File::create(path).map_err(|e| to_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).map_err(|e| to_error(e.to_string()))?;
    writer.flush().map_err(|e| to_error(e.to_string()))
}
