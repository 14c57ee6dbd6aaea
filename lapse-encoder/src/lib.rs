//! Lapse Encoder Library
//!
//! Drives an external `ffmpeg` process over an annotated frame sequence and
//! turns its diagnostic output into live progress.

pub mod diagnostics;
pub mod output_path;
pub mod probe;
pub mod progress_monitor;
pub mod supervisor;

pub use output_path::resolve_output_path;
pub use progress_monitor::{ConsoleProgress, EncoderProgressMonitor, ProgressSink, ProgressSnapshot};
pub use supervisor::VideoAssembler;

use std::ffi::OsString;
use std::path::PathBuf;

/// Result type for lapse-encoder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for lapse-encoder operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Lapse core error: {0}")]
    Core(#[from] lapse_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No frames to encode in {}", .0.display())]
    NotFound(PathBuf),

    #[error("Encoder exited with {}", describe_exit(.code))]
    EncoderFailed {
        code: Option<i32>,
        diagnostics: Vec<String>,
    },

    #[error("Failed to start {}: {source}", .program.to_string_lossy())]
    Spawn {
        program: OsString,
        source: std::io::Error,
    },

    #[error("Encoder unavailable: {0}")]
    DependencyMissing(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Encoder executable and the fixed H.264 output settings
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    /// Encoder executable, looked up on `PATH` when relative
    pub program: PathBuf,
    pub video_codec: &'static str,
    pub pixel_format: &'static str,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            video_codec: "libx264",
            pixel_format: "yuv420p",
        }
    }
}

impl EncoderSettings {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }
}
