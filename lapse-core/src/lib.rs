//! Lapse Core Library
//!
//! Shared building blocks for turning a folder of timestamped stills into an
//! annotated timelapse: the run configuration, the filename timestamp parser,
//! frame naming and batch progress reporting.

pub mod config;
pub mod frame;
pub mod progress_tracker;
pub mod timestamp;

pub use config::TimelapseConfig;
pub use progress_tracker::ProgressTracker;
pub use timestamp::label_from_stem;

/// Result type for lapse-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for lapse-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },
}
