//! Encoder availability check

use crate::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs `<program> -version` and returns the first line it prints.
///
/// A program that cannot be started or exits non-zero is reported as
/// [`Error::DependencyMissing`].
pub fn encoder_version(program: &Path) -> Result<String> {
    let output = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| {
            Error::DependencyMissing(format!(
                "{} could not be started ({}); is it installed and on PATH?",
                program.display(),
                e
            ))
        })?;

    if !output.status.success() {
        return Err(Error::DependencyMissing(format!(
            "{} -version exited with {}",
            program.display(),
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().next().unwrap_or("").trim().to_string();
    Ok(if first_line.is_empty() {
        format!("{} (version unknown)", program.display())
    } else {
        first_line
    })
}
