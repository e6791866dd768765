//! Image preprocessing for tag localization samples
//!
//! Border padding, local histogram equalization and adaptive thresholding,
//! chained by a [`Pipeline`] configured from [`PreprocessOptions`](crate::config::PreprocessOptions).

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, PreprocessingResult, StepTiming};
