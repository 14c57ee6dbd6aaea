//! Collision-free output file naming

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Returns `desired` if nothing exists there yet, otherwise the first free
/// `<stem>_<n>.<ext>` sibling counting up from 1.
pub fn resolve_output_path(desired: &Path) -> PathBuf {
    if !desired.exists() {
        return desired.to_path_buf();
    }

    let stem = desired.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    let extension = desired.extension();

    let mut counter: u64 = 1;
    loop {
        let mut name = OsString::from(&stem);
        name.push(format!("_{}", counter));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        let candidate = desired.with_file_name(&name);
        if !candidate.exists() {
            log::info!(
                "{} already exists, writing to {} instead",
                desired.display(),
                candidate.display()
            );
            return candidate;
        }
        counter += 1;
    }
}
