//! Batch annotation of a source folder into a numbered frame sequence

use crate::annotator::Annotate;
use crate::{Error, Result};
use lapse_core::frame::frame_path;
use lapse_core::timestamp::label_for_path;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted as source images (compared case-insensitively)
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Lists the source images in `dir`, sorted by file name.
///
/// The `YYYYMMDD_HHMMSS` naming makes file-name order chronological.
pub fn list_source_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()));
        if matches {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Annotates every source image in `source_dir` into `temp_dir` as
/// `frame_000000.jpg`, `frame_000001.jpg`, ...
///
/// `on_progress` receives `(0, total)` before the first frame and
/// `(done, total)` after each one. The first frame that fails aborts the
/// batch; frames already written stay in `temp_dir`.
pub fn annotate_all<A, F>(
    source_dir: &Path,
    temp_dir: &Path,
    annotator: &A,
    mut on_progress: F,
) -> Result<usize>
where
    A: Annotate + ?Sized,
    F: FnMut(usize, usize),
{
    let sources = match list_source_images(source_dir) {
        Ok(sources) => sources,
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Source folder {} does not exist", source_dir.display());
            return Err(Error::NotFound(source_dir.to_path_buf()));
        }
        Err(e) => return Err(e),
    };
    if sources.is_empty() {
        log::warn!("No source images found in {}", source_dir.display());
        return Err(Error::NotFound(source_dir.to_path_buf()));
    }

    fs::create_dir_all(temp_dir)?;

    let total = sources.len();
    log::info!(
        "Annotating {} images from {} into {}",
        total,
        source_dir.display(),
        temp_dir.display()
    );
    on_progress(0, total);

    for (index, source) in sources.iter().enumerate() {
        let label = label_for_path(source);
        let destination = frame_path(temp_dir, index);

        if !annotator.annotate(source, &destination, &label) {
            log::error!("Image processing failed: {}", source.display());
            return Err(Error::ProcessingFailed(source.clone()));
        }

        on_progress(index + 1, total);
    }

    log::info!("Added timestamp labels to {} images", total);
    Ok(total)
}
