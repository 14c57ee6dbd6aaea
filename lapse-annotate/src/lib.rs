//! Lapse Annotation Library
//!
//! Burns the capture timestamp into every source image and writes the result
//! as a numbered frame sequence ready for the encoder.

pub mod annotator;
pub mod bitmap_font;
pub mod font;
pub mod measure;
pub mod overlay;
pub mod pipeline;
pub mod probe;

pub use annotator::{Annotate, FrameAnnotator, LabelStyle};
pub use font::LabelFont;
pub use pipeline::{annotate_all, list_source_images};

use std::path::PathBuf;

/// Result type for lapse-annotate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for lapse-annotate operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Lapse core error: {0}")]
    Core(#[from] lapse_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("No source images found in {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to annotate {}", .0.display())]
    ProcessingFailed(PathBuf),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Image library unusable: {0}")]
    DependencyMissing(String),
}
