//! Lapse CLI Tool
//!
//! Turns a folder of `YYYYMMDD_HHMMSS.jpg` stills into a timestamped
//! timelapse video.

use anyhow::{Context, Result};
use clap::Parser;
use lapse_cli::run::format_elapsed;
use lapse_cli::{env_file, logging, run, ErrorKind, RunError};
use lapse_core::TimelapseConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lapse")]
#[command(about = "Create a timelapse video with a timestamp on every frame")]
#[command(version)]
struct Cli {
    /// Folder holding the source JPEG images
    #[arg(long)]
    images: Option<PathBuf>,

    /// Scratch folder for annotated frames (removed afterwards)
    #[arg(long)]
    temp: Option<PathBuf>,

    /// Folder the video is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// TrueType font used for the timestamp label
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Encoder executable
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Output video file (defaults to timelapse_<folder>.mp4 in the output folder)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<(TimelapseConfig, PathBuf)> {
        let mut config = env_file::load_config(Path::new(env_file::DEFAULT_ENV_FILE))
            .context("Failed to read configuration")?;

        if let Some(images) = self.images {
            config.image_folder = images;
        }
        if let Some(temp) = self.temp {
            config.temp_folder = temp;
        }
        if let Some(dir) = self.output_dir {
            config.output_video_dir = dir;
        }
        if let Some(font) = self.font {
            config.font_path = font;
        }
        if let Some(fps) = self.fps {
            anyhow::ensure!(fps > 0, "--fps must be greater than zero");
            config.fps = fps;
        }
        if let Some(ffmpeg) = self.ffmpeg {
            config.ffmpeg_path = ffmpeg;
        }
        if let Some(log_file) = self.log_file {
            config.log_file = log_file;
        }

        let output = self
            .output
            .unwrap_or_else(|| config.default_output_path());
        Ok((config, output))
    }
}

fn report_failure(error: &RunError, config: &TimelapseConfig) {
    log::error!("Run failed ({:?}): {:?}", error.kind(), error);

    match error.kind() {
        ErrorKind::NotFound => eprintln!("File not found: {}", error),
        ErrorKind::ProcessingFailed => eprintln!("Image processing failed: {}", error),
        ErrorKind::DependencyMissing => {
            eprintln!("Error: {}", error);
            eprintln!("Install ffmpeg and make sure it is on PATH, or pass --ffmpeg.");
        }
        ErrorKind::EncoderFailed => {
            eprintln!("Video encoding failed: {}", error);
            match error.diagnostics().first() {
                Some(line) => eprintln!("Details: {}", line),
                None => eprintln!("Details: none reported"),
            }
        }
        ErrorKind::Other => eprintln!("An error occurred: {}", error),
    }
    eprintln!("See {} for details.", config.log_file.display());
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let (config, output) = cli.into_config()?;

    logging::init(&config.log_file);
    log::info!("Starting timelapse run: {:?}", config);

    match run(&config, &output) {
        Ok(report) => {
            println!(
                "Timelapse saved to {} ({} frames)",
                report.output.display(),
                report.frames
            );
            println!("Elapsed: {}", format_elapsed(report.elapsed));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            report_failure(&e, &config);
            Ok(ExitCode::FAILURE)
        }
    }
}
