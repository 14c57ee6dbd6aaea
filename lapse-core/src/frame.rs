//! Naming of annotated frames in the working directory
//!
//! Frames are numbered from zero with a fixed six-digit width so the encoder's
//! printf-style input pattern walks them in order without gaps.

use std::fs;
use std::path::{Path, PathBuf};

pub const FRAME_PREFIX: &str = "frame_";
pub const FRAME_EXTENSION: &str = "jpg";

/// Input pattern handed to the encoder, matching [`frame_file_name`]
pub const ENCODER_INPUT_PATTERN: &str = "frame_%06d.jpg";

/// Returns the file name of the frame at `index`
pub fn frame_file_name(index: usize) -> String {
    format!("{}{:06}.{}", FRAME_PREFIX, index, FRAME_EXTENSION)
}

/// Returns the full path of the frame at `index` inside `dir`
pub fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(frame_file_name(index))
}

/// Checks whether a file name looks like an annotated frame (`frame_*.jpg`)
pub fn is_frame_file_name(name: &str) -> bool {
    name.len() > FRAME_PREFIX.len() + FRAME_EXTENSION.len() + 1
        && name.starts_with(FRAME_PREFIX)
        && name
            .strip_suffix(FRAME_EXTENSION)
            .is_some_and(|rest| rest.ends_with('.'))
}

/// Counts the annotated frames present in `dir`
pub fn count_frames(dir: &Path) -> std::io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if is_frame_file_name(&entry.file_name().to_string_lossy()) {
            count += 1;
        }
    }
    Ok(count)
}
