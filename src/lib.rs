//! Batch preprocessing of tag localization images
//!
//! Pads every image listed in a pathfile with a replicated border, optionally
//! applies CLAHE and Gaussian adaptive thresholding, writes `<stem>_wb<ext>`
//! files and a pathfile of the written images.

pub mod batch;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod manifest;
pub mod preprocessing;

pub use batch::{run, BatchReport};
pub use cli::Args;
pub use config::{Config, PreprocessOptions, TagSize};
pub use error::PreprocessError;
