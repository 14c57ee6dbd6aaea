//! Encoder process supervision
//!
//! The encoder runs as a child process. Its stderr is read line by line while
//! it works; every line feeds the progress monitor and is scanned for error
//! reports. Once the process has exited, whatever output is left is drained
//! for error reports only. The exit status decides success.

use crate::diagnostics::DiagnosticLines;
use crate::output_path::resolve_output_path;
use crate::progress_monitor::{ConsoleProgress, EncoderProgressMonitor, ProgressSink};
use crate::{EncoderSettings, Error, Result};
use lapse_core::frame::{count_frames, ENCODER_INPUT_PATTERN};
use std::ffi::OsString;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// Upper bound on error lines kept for the failure report
const MAX_DIAGNOSTICS: usize = 64;

/// Child process that is killed and reaped if dropped while still running
struct SupervisedChild {
    child: Child,
    reaped: bool,
}

impl SupervisedChild {
    fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        self.reaped = status.is_some();
        Ok(status)
    }

    fn wait(&mut self) -> std::io::Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status)
    }
}

impl Drop for SupervisedChild {
    fn drop(&mut self) {
        if !self.reaped {
            log::warn!("Stopping encoder process {}", self.child.id());
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Collects encoder output lines that mention an error
#[derive(Debug, Default)]
struct ErrorScan {
    lines: Vec<String>,
}

impl ErrorScan {
    fn inspect(&mut self, line: &str) {
        if !line.to_lowercase().contains("error") {
            return;
        }
        log::error!("Encoder output: {}", line.trim());
        if self.lines.len() < MAX_DIAGNOSTICS {
            self.lines.push(line.trim().to_string());
        }
    }
}

/// Assembles annotated frames into a video with an external encoder
#[derive(Debug, Clone, Default)]
pub struct VideoAssembler {
    settings: EncoderSettings,
}

impl VideoAssembler {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Encoder arguments for the frames in `frame_dir` written to `output`
    pub fn command_args(&self, frame_dir: &Path, fps: u32, output: &Path) -> Vec<OsString> {
        vec![
            "-framerate".into(),
            fps.to_string().into(),
            "-i".into(),
            frame_dir.join(ENCODER_INPUT_PATTERN).into_os_string(),
            "-c:v".into(),
            self.settings.video_codec.into(),
            "-pix_fmt".into(),
            self.settings.pixel_format.into(),
            "-y".into(),
            output.as_os_str().to_os_string(),
        ]
    }

    /// Encodes `frame_dir` into `desired_output`, or a suffixed sibling if
    /// that file already exists, showing progress on the console.
    pub fn assemble(&self, frame_dir: &Path, desired_output: &Path, fps: u32) -> Result<PathBuf> {
        self.assemble_with(frame_dir, desired_output, fps, ConsoleProgress::new())
    }

    /// Same as [`assemble`](Self::assemble) with a custom progress sink
    pub fn assemble_with<S: ProgressSink>(
        &self,
        frame_dir: &Path,
        desired_output: &Path,
        fps: u32,
        sink: S,
    ) -> Result<PathBuf> {
        let total_frames = match count_frames(frame_dir) {
            Ok(count) => count,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        if total_frames == 0 {
            log::error!("No frames to encode in {}", frame_dir.display());
            return Err(Error::NotFound(frame_dir.to_path_buf()));
        }

        if let Some(parent) = desired_output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let output = resolve_output_path(desired_output);

        let args = self.command_args(frame_dir, fps, &output);
        log::info!(
            "Encoding {} frames at {} fps: {} {}",
            total_frames,
            fps,
            self.settings.program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let child = Command::new(&self.settings.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.settings.program.clone().into_os_string(),
                source,
            })?;
        let mut child = SupervisedChild {
            child,
            reaped: false,
        };

        let mut monitor = EncoderProgressMonitor::new(total_frames as u64, sink);
        let mut errors = ErrorScan::default();

        let status = match child.child.stderr.take() {
            Some(stderr) => {
                let mut lines = DiagnosticLines::new(BufReader::new(stderr));
                let status = loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    match lines.next() {
                        Some(Ok(line)) => {
                            monitor.observe(&line);
                            errors.inspect(&line);
                        }
                        Some(Err(e)) => {
                            log::warn!("Lost encoder diagnostics: {}", e);
                            break child.wait()?;
                        }
                        None => break child.wait()?,
                    }
                };

                for line in lines {
                    match line {
                        Ok(line) => errors.inspect(&line),
                        Err(e) => {
                            log::warn!("Lost encoder diagnostics: {}", e);
                            break;
                        }
                    }
                }
                status
            }
            None => child.wait()?,
        };

        if !status.success() {
            log::error!("Encoder exited unsuccessfully: {}", status);
            return Err(Error::EncoderFailed {
                code: status.code(),
                diagnostics: errors.lines,
            });
        }

        monitor.finish();
        log::info!("Created video {}", output.display());
        Ok(output)
    }
}
