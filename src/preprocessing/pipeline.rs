use crate::config::PreprocessOptions;
use crate::error::PreprocessError;
use image::GrayImage;
use serde::Serialize;
use std::time::Instant;

use super::steps;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone)]
pub struct PreprocessingResult {
    pub image: GrayImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Preprocessing pipeline: border, then CLAHE, then thresholding
pub struct Pipeline {
    options: PreprocessOptions,
}

impl Pipeline {
    /// Options are normalized on construction, so binary output always runs thresholding
    pub fn new(options: PreprocessOptions) -> Self {
        Self {
            options: options.normalized(),
        }
    }

    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }

    /// Process an image according to the configured options
    pub fn process(&self, image: GrayImage) -> Result<PreprocessingResult, PreprocessError> {
        let start = Instant::now();
        let mut steps_timing = Vec::new();
        let opts = &self.options;

        let mut img = image;

        if opts.border {
            img = self.run_step("border", img, &mut steps_timing, |img| {
                steps::border::apply(img, opts.tag_size)
            })?;
        }

        if opts.hist_eq {
            img = self.run_step("clahe", img, &mut steps_timing, |img| {
                steps::clahe::apply(img, opts.clip_limit, opts.tag_size)
            })?;
        }

        if opts.threshold {
            img = self.run_step("threshold", img, &mut steps_timing, |img| {
                steps::threshold::apply(img, opts.binary_image)
            })?;
        }

        Ok(PreprocessingResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: steps_timing,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: GrayImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<GrayImage, PreprocessError>
    where
        F: FnOnce(GrayImage) -> Result<GrayImage, PreprocessError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!(step = name, time_ms, "preprocessing step done");
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms,
        });
        Ok(result)
    }
}
