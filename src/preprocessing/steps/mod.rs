//! Individual preprocessing steps

pub mod border;
pub mod clahe;
pub mod threshold;
