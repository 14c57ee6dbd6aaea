//! End-to-end timelapse run

use lapse_annotate::{annotate_all, FrameAnnotator, LabelStyle};
use lapse_core::{ProgressTracker, TimelapseConfig};
use lapse_encoder::{EncoderSettings, VideoAssembler};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Coarse classification of a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No source images, or no frames to encode
    NotFound,
    /// A single frame could not be annotated
    ProcessingFailed,
    /// The encoder exited unsuccessfully
    EncoderFailed,
    /// The image codecs or the encoder binary are unusable
    DependencyMissing,
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{0}")]
    DependencyMissing(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Annotate(#[from] lapse_annotate::Error),

    #[error(transparent)]
    Encode(#[from] lapse_encoder::Error),
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        use lapse_annotate::Error as A;
        use lapse_encoder::Error as E;

        match self {
            RunError::DependencyMissing(_)
            | RunError::Annotate(A::DependencyMissing(_))
            | RunError::Encode(E::DependencyMissing(_)) => ErrorKind::DependencyMissing,
            RunError::Annotate(A::NotFound(_)) | RunError::Encode(E::NotFound(_)) => {
                ErrorKind::NotFound
            }
            RunError::Annotate(A::ProcessingFailed(_)) => ErrorKind::ProcessingFailed,
            RunError::Encode(E::EncoderFailed { .. }) => ErrorKind::EncoderFailed,
            _ => ErrorKind::Other,
        }
    }

    /// Encoder exit code, when the encoder is what failed
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunError::Encode(lapse_encoder::Error::EncoderFailed { code, .. }) => *code,
            _ => None,
        }
    }

    /// Error lines the encoder printed, when the encoder is what failed
    pub fn diagnostics(&self) -> &[String] {
        match self {
            RunError::Encode(lapse_encoder::Error::EncoderFailed { diagnostics, .. }) => diagnostics,
            _ => &[],
        }
    }
}

/// What the dependency check found
#[derive(Debug, Clone)]
pub struct Dependencies {
    pub encoder_version: String,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output: PathBuf,
    pub frames: usize,
    pub elapsed: Duration,
}

/// Removes a scratch folder when dropped, if it exists by then.
///
/// Removal problems are logged and printed as a warning, never returned.
pub struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => log::info!("Removed temporary folder {}", self.path.display()),
            Err(e) => {
                log::warn!(
                    "Failed to remove temporary folder {}: {}",
                    self.path.display(),
                    e
                );
                eprintln!(
                    "Warning: failed to remove temporary folder {}",
                    self.path.display()
                );
            }
        }
    }
}

/// Verifies the image codecs and the encoder binary before any file is touched
pub fn check_dependencies(config: &TimelapseConfig) -> Result<Dependencies, RunError> {
    lapse_annotate::probe::check_jpeg_codec()
        .map_err(|e| RunError::DependencyMissing(e.to_string()))?;

    let encoder_version = lapse_encoder::probe::encoder_version(&config.ffmpeg_path)
        .map_err(|e| RunError::DependencyMissing(e.to_string()))?;

    Ok(Dependencies { encoder_version })
}

/// True when removing `scratch` recursively would also remove `sources`
fn scratch_holds_sources(scratch: &Path, sources: &Path) -> bool {
    match (scratch.canonicalize(), sources.canonicalize()) {
        (Ok(scratch), Ok(sources)) => sources.starts_with(scratch),
        _ => sources.starts_with(scratch),
    }
}

/// Feeds annotation progress to a console tracker.
///
/// The tracker is created on the `(0, total)` start notification so that its
/// clock covers the first frame.
#[derive(Default)]
pub struct AnnotationProgress {
    tracker: Option<ProgressTracker>,
}

impl AnnotationProgress {
    pub fn observe(&mut self, done: usize, total: usize) {
        let tracker = self.tracker.get_or_insert_with(|| {
            println!("Annotating {} images", total);
            ProgressTracker::new(total, "Annotating")
        });
        tracker.report(done);
    }

    pub fn tracker(&self) -> Option<&ProgressTracker> {
        self.tracker.as_ref()
    }
}

/// Annotates `config.image_folder` and encodes it into `desired_output` (or a
/// numbered sibling if that file exists).
///
/// The scratch folder is removed on every path out of this function once the
/// dependency check has passed.
pub fn run(config: &TimelapseConfig, desired_output: &Path) -> Result<RunReport, RunError> {
    if scratch_holds_sources(&config.temp_folder, &config.image_folder) {
        return Err(RunError::Config(format!(
            "temporary folder {} must not contain the image folder {}",
            config.temp_folder.display(),
            config.image_folder.display()
        )));
    }

    let dependencies = check_dependencies(config).inspect_err(|e| {
        log::error!("Dependency check failed: {}", e);
    })?;
    println!("Encoder: {}", dependencies.encoder_version);
    log::info!("Encoder: {}", dependencies.encoder_version);

    let started = Instant::now();
    let _cleanup = TempDirGuard::new(&config.temp_folder);

    println!("Creating timelapse from {}", config.image_folder.display());
    let style = LabelStyle {
        font_size: config.font_size,
        ..LabelStyle::default()
    };
    let annotator = FrameAnnotator::with_font_path(&config.font_path, style);

    let mut progress = AnnotationProgress::default();
    let frames = annotate_all(
        &config.image_folder,
        &config.temp_folder,
        &annotator,
        |done, total| progress.observe(done, total),
    )?;
    println!("Added timestamps to {} images", frames);

    println!("Encoding {} frames at {} fps", frames, config.fps);
    let assembler = VideoAssembler::new(EncoderSettings::with_program(&config.ffmpeg_path));
    let output = assembler.assemble(&config.temp_folder, desired_output, config.fps)?;

    let elapsed = started.elapsed();
    log::info!(
        "Timelapse {} finished: {} frames in {:.1}s",
        output.display(),
        frames,
        elapsed.as_secs_f64()
    );

    Ok(RunReport {
        output,
        frames,
        elapsed,
    })
}

/// Formats a run duration as `<minutes>m <seconds>s`
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64();
    let minutes = (total / 60.0).floor();
    format!("{}m {:.1}s", minutes as u64, total - minutes * 60.0)
}
