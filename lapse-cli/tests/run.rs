#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use image::{Rgb, RgbImage};
use lapse_cli::{run, ErrorKind};
use lapse_core::TimelapseConfig;
use tempfile::{tempdir, TempDir};

const STEMS: [&str; 3] = ["20240101_120000", "20240101_120500", "20240101_121000"];

/// Stand-in encoder: answers `-version`, records its arguments, runs `body`
/// with `$out` bound to the output path and exits with `exit_code`.
fn fake_encoder(dir: &Path, body: &str, exit_code: i32) -> PathBuf {
    let path = dir.join("fake-ffmpeg");
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"-version\" ]; then echo \"ffmpeg version 9.9-fake\"; exit 0; fi\n\
         for arg in \"$@\"; do out=\"$arg\"; done\n\
         printf '%s ' \"$@\" > '{}'\n\
         {}\n\
         exit {}\n",
        dir.join("args.txt").display(),
        body,
        exit_code
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    for _ in 0..50 {
        match Command::new(&path).arg("-version").output() {
            Err(e) if e.raw_os_error() == Some(26) => thread::sleep(Duration::from_millis(20)),
            _ => break,
        }
    }
    path
}

fn write_sources(dir: &Path, stems: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for (i, stem) in stems.iter().enumerate() {
        let shade = 40 + 60 * i as u8;
        RgbImage::from_pixel(96, 64, Rgb([shade, shade, shade]))
            .save(dir.join(format!("{}.jpg", stem)))
            .unwrap();
    }
}

struct Workspace {
    root: TempDir,
    config: TimelapseConfig,
}

impl Workspace {
    fn new(encoder_body: &str, exit_code: i32) -> Self {
        let root = tempdir().unwrap();
        let ffmpeg_path = fake_encoder(root.path(), encoder_body, exit_code);
        let config = TimelapseConfig {
            image_folder: root.path().join("input_images"),
            temp_folder: root.path().join("temp_labeled"),
            output_video_dir: root.path().join("output"),
            font_path: root.path().join("missing-font.ttf"),
            ffmpeg_path,
            log_file: root.path().join("timelapse_creation.log"),
            ..TimelapseConfig::default()
        };
        Self { root, config }
    }

    fn output(&self) -> PathBuf {
        self.config.output_video_dir.join("timelapse.mp4")
    }

    fn args(&self) -> Option<String> {
        fs::read_to_string(self.root.path().join("args.txt")).ok()
    }
}

#[test]
fn test_run_produces_video_and_removes_scratch_folder() {
    let ws = Workspace::new(": > \"$out\"", 0);
    write_sources(&ws.config.image_folder, &STEMS);

    let report = run(&ws.config, &ws.output()).unwrap();

    assert_eq!(report.frames, 3);
    assert_eq!(report.output, ws.output());
    assert!(report.output.is_file());
    assert!(!ws.config.temp_folder.exists());

    let videos: Vec<_> = fs::read_dir(&ws.config.output_video_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(videos.len(), 1);

    let args = ws.args().unwrap();
    assert!(args.contains("-framerate 24 "));
    assert!(args.contains("frame_%06d.jpg"));

    // Sources are left untouched.
    assert_eq!(fs::read_dir(&ws.config.image_folder).unwrap().count(), 3);
}

#[test]
fn test_existing_output_gets_numbered_sibling() {
    let ws = Workspace::new(": > \"$out\"", 0);
    write_sources(&ws.config.image_folder, &STEMS[..1]);
    fs::create_dir_all(&ws.config.output_video_dir).unwrap();
    fs::write(ws.output(), b"old").unwrap();

    let report = run(&ws.config, &ws.output()).unwrap();

    assert_eq!(
        report.output,
        ws.config.output_video_dir.join("timelapse_1.mp4")
    );
    assert_eq!(fs::read(ws.output()).unwrap(), b"old");
}

#[test]
fn test_empty_source_folder_is_not_found() {
    let ws = Workspace::new(": > \"$out\"", 0);
    fs::create_dir_all(&ws.config.image_folder).unwrap();
    fs::create_dir_all(&ws.config.temp_folder).unwrap();
    fs::write(ws.config.temp_folder.join("stale.jpg"), b"x").unwrap();

    let err = run(&ws.config, &ws.output()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!ws.config.temp_folder.exists());
    assert!(!ws.output().exists());
    assert!(ws.args().is_none());
}

#[test]
fn test_encoder_failure_reports_exit_code_and_cleans_up() {
    let ws = Workspace::new("echo \"Error while opening encoder\" >&2", 1);
    write_sources(&ws.config.image_folder, &STEMS);

    let err = run(&ws.config, &ws.output()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EncoderFailed);
    assert_eq!(err.exit_code(), Some(1));
    assert!(err
        .diagnostics()
        .iter()
        .any(|line| line.contains("Error while opening encoder")));
    assert!(!ws.config.temp_folder.exists());
}

#[test]
fn test_corrupt_image_stops_before_encoding() {
    let ws = Workspace::new(": > \"$out\"", 0);
    write_sources(&ws.config.image_folder, &STEMS[..1]);
    fs::write(
        ws.config.image_folder.join("20240101_130000.jpg"),
        b"not a jpeg",
    )
    .unwrap();

    let err = run(&ws.config, &ws.output()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProcessingFailed);
    assert!(ws.args().is_none());
    assert!(!ws.config.temp_folder.exists());
}

#[test]
fn test_missing_encoder_creates_nothing() {
    let mut ws = Workspace::new("", 0);
    ws.config.ffmpeg_path = ws.root.path().join("no-such-ffmpeg");
    write_sources(&ws.config.image_folder, &STEMS);

    let err = run(&ws.config, &ws.output()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DependencyMissing);
    assert!(!ws.config.temp_folder.exists());
    assert!(!ws.config.output_video_dir.exists());
}

#[test]
fn test_scratch_folder_equal_to_sources_is_rejected() {
    let mut ws = Workspace::new(": > \"$out\"", 0);
    write_sources(&ws.config.image_folder, &STEMS);
    ws.config.temp_folder = ws.config.image_folder.clone();

    let err = run(&ws.config, &ws.output()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Other);
    assert_eq!(fs::read_dir(&ws.config.image_folder).unwrap().count(), 3);
}

#[test]
fn test_scratch_folder_above_sources_is_rejected() {
    let mut ws = Workspace::new(": > \"$out\"", 0);
    write_sources(&ws.config.image_folder, &STEMS);
    ws.config.temp_folder = ws.root.path().to_path_buf();

    let err = run(&ws.config, &ws.output()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Other);
    assert!(ws.root.path().exists());
    assert_eq!(fs::read_dir(&ws.config.image_folder).unwrap().count(), 3);
    assert!(ws.args().is_none());
}
