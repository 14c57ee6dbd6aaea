//! Run configuration resolved from the environment

use crate::{Error, Result};
use std::path::{Path, PathBuf};

pub const ENV_IMAGE_FOLDER: &str = "TIMELAPSE_IMAGE_FOLDER";
pub const ENV_TEMP_FOLDER: &str = "TIMELAPSE_TEMP_FOLDER";
pub const ENV_OUTPUT_DIR: &str = "TIMELAPSE_OUTPUT_DIR";
pub const ENV_FONT_PATH: &str = "TIMELAPSE_FONT_PATH";
pub const ENV_FPS: &str = "TIMELAPSE_FPS";
pub const ENV_FFMPEG: &str = "TIMELAPSE_FFMPEG";
pub const ENV_LOG_FILE: &str = "TIMELAPSE_LOG_FILE";

/// Everything a timelapse run needs, resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct TimelapseConfig {
    /// Folder holding the `YYYYMMDD_HHMMSS.jpg` source images
    pub image_folder: PathBuf,
    /// Scratch folder for annotated frames, removed after the run
    pub temp_folder: PathBuf,
    /// Folder the finished video is written to
    pub output_video_dir: PathBuf,
    /// TrueType font used for the label
    pub font_path: PathBuf,
    /// Label height in pixels
    pub font_size: f32,
    /// Output frame rate
    pub fps: u32,
    /// Encoder executable
    pub ffmpeg_path: PathBuf,
    /// Log file written by the CLI
    pub log_file: PathBuf,
}

impl Default for TimelapseConfig {
    fn default() -> Self {
        Self {
            image_folder: PathBuf::from("./input_images"),
            temp_folder: PathBuf::from("./temp_labeled"),
            output_video_dir: PathBuf::from("./output"),
            font_path: PathBuf::from("./assets/fonts/arial.ttf"),
            font_size: 24.0,
            fps: 24,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            log_file: PathBuf::from("timelapse_creation.log"),
        }
    }
}

impl TimelapseConfig {
    /// Reads the configuration through `lookup`; unset or empty keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(ENV_IMAGE_FOLDER) {
            config.image_folder = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_TEMP_FOLDER) {
            config.temp_folder = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_OUTPUT_DIR) {
            config.output_video_dir = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_FONT_PATH) {
            config.font_path = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_FFMPEG) {
            config.ffmpeg_path = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_LOG_FILE) {
            config.log_file = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_FPS) {
            config.fps = parse_fps(&value)?;
        }

        Ok(config)
    }

    /// Default video path: `<output dir>/timelapse_<image folder name>.mp4`
    pub fn default_output_path(&self) -> PathBuf {
        self.output_video_dir
            .join(format!("timelapse_{}.mp4", folder_name(&self.image_folder)))
    }
}

/// Parses a frame rate, rejecting zero and non-numeric input
pub fn parse_fps(value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(fps) if fps > 0 => Ok(fps),
        _ => Err(Error::InvalidConfig {
            key: ENV_FPS,
            value: value.to_string(),
        }),
    }
}

fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .or_else(|| {
            path.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "images".to_string())
}
