//! Capture timestamps encoded in source filenames
//!
//! Source images are named `YYYYMMDD_HHMMSS.<ext>`. The label burnt into each
//! frame is the same instant rendered as `YYYY-MM-DD HH:MM`.

use chrono::NaiveDateTime;
use std::path::Path;

/// Pattern the filename stem must match exactly
pub const STEM_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Pattern of the rendered label
pub const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parses a filename stem into a capture time.
///
/// Only the fixed-width digit layout is accepted; chrono alone would also take
/// signed years and a leap second `60`.
pub fn parse_stem(stem: &str) -> Option<NaiveDateTime> {
    let bytes = stem.as_bytes();
    if bytes.len() != 15 || bytes[8] != b'_' {
        return None;
    }
    let digits_ok = bytes[..8]
        .iter()
        .chain(&bytes[9..])
        .all(|b| b.is_ascii_digit());
    if !digits_ok || &stem[13..] > "59" {
        return None;
    }
    NaiveDateTime::parse_from_str(stem, STEM_FORMAT).ok()
}

/// Returns the display label for a filename stem, or an empty string when the
/// stem does not carry a valid timestamp.
///
/// A mismatch is logged as a warning and never treated as an error: the frame
/// is still annotated, just without visible text.
pub fn label_from_stem(stem: &str) -> String {
    match parse_stem(stem) {
        Some(time) => time.format(LABEL_FORMAT).to_string(),
        None => {
            log::warn!(
                "Could not read a capture time from file name {:?} (expected {})",
                stem,
                STEM_FORMAT
            );
            String::new()
        }
    }
}

/// Convenience wrapper over [`label_from_stem`] for a full path
pub fn label_for_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    label_from_stem(&stem)
}
