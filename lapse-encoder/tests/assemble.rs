#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use lapse_encoder::{
    probe, EncoderSettings, Error, ProgressSink, ProgressSnapshot, VideoAssembler,
};
use tempfile::tempdir;

/// Writes an executable stand-in for ffmpeg that logs its arguments to
/// `<dir>/args.txt`, runs `body`, then exits with `exit_code`.
fn fake_encoder(dir: &Path, body: &str, exit_code: i32) -> PathBuf {
    let path = dir.join("fake-ffmpeg");
    let args_file = dir.join("args.txt");
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"-version\" ]; then echo \"ffmpeg version 9.9-fake\"; exit 0; fi\n\
         for arg in \"$@\"; do out=\"$arg\"; done\n\
         printf '%s ' \"$@\" > '{}'\n\
         {}\n\
         exit {}\n",
        args_file.display(),
        body,
        exit_code
    );
    fs::write(&path, script).expect("script should write");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod should work");
    wait_until_executable(&path);
    path
}

/// Another test thread forking while the script was open for writing makes
/// exec fail with ETXTBSY for a moment.
fn wait_until_executable(path: &Path) {
    for _ in 0..50 {
        match Command::new(path).arg("-version").output() {
            Err(e) if e.raw_os_error() == Some(26) => thread::sleep(Duration::from_millis(20)),
            _ => return,
        }
    }
}

fn write_frames(dir: &Path, count: usize) {
    fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        fs::write(dir.join(format!("frame_{:06}.jpg", i)), b"jpeg").unwrap();
    }
}

#[derive(Default)]
struct Recorder {
    updates: Vec<ProgressSnapshot>,
    finished: Option<u64>,
}

impl ProgressSink for &mut Recorder {
    fn update(&mut self, snapshot: &ProgressSnapshot) {
        self.updates.push(snapshot.clone());
    }

    fn finish(&mut self, total: u64) {
        self.finished = Some(total);
    }
}

const PROGRESS_BODY: &str = "printf 'Input #0, image2, from frames\\n' >&2\n\
    printf 'frame=    1 fps=0.0 q=0.0\\rframe=    2 fps=0.0\\rframe=    3 fps=0.0 Lsize=1kB\\n' >&2\n\
    printf 'fake mp4' > \"$out\"";

#[test]
fn successful_encode_returns_output_path() {
    let work = tempdir().unwrap();
    let frames = work.path().join("frames");
    write_frames(&frames, 3);
    let program = fake_encoder(work.path(), PROGRESS_BODY, 0);
    let desired = work.path().join("output").join("timelapse_cam.mp4");

    let mut recorder = Recorder::default();
    let assembler = VideoAssembler::new(EncoderSettings::with_program(&program));
    let output = assembler
        .assemble_with(&frames, &desired, 24, &mut recorder)
        .expect("encode should succeed");

    assert_eq!(output, desired);
    assert_eq!(fs::read(&output).unwrap(), b"fake mp4");
    assert_eq!(recorder.finished, Some(3));

    let args = fs::read_to_string(work.path().join("args.txt")).unwrap();
    let expected = format!(
        "-framerate 24 -i {}/frame_%06d.jpg -c:v libx264 -pix_fmt yuv420p -y {}",
        frames.display(),
        desired.display()
    );
    assert_eq!(args.trim(), expected);
}

#[test]
fn existing_output_gets_numbered_sibling() {
    let work = tempdir().unwrap();
    let frames = work.path().join("frames");
    write_frames(&frames, 2);
    let program = fake_encoder(work.path(), PROGRESS_BODY, 0);
    let desired = work.path().join("timelapse_x.mp4");
    fs::write(&desired, b"keep me").unwrap();
    fs::write(work.path().join("timelapse_x_1.mp4"), b"keep me too").unwrap();

    let assembler = VideoAssembler::new(EncoderSettings::with_program(&program));
    let output = assembler
        .assemble_with(&frames, &desired, 30, &mut Recorder::default())
        .unwrap();

    assert_eq!(output, work.path().join("timelapse_x_2.mp4"));
    assert_eq!(fs::read(&desired).unwrap(), b"keep me");
    assert_eq!(fs::read(work.path().join("timelapse_x_1.mp4")).unwrap(), b"keep me too");
    assert_eq!(fs::read(&output).unwrap(), b"fake mp4");
}

#[test]
fn nonzero_exit_is_encoder_failed_with_code_and_errors() {
    let work = tempdir().unwrap();
    let frames = work.path().join("frames");
    write_frames(&frames, 3);
    let body = "printf 'frame=    1 fps=0.0\\r' >&2\n\
        printf '[out#0/mp4] Error opening output file\\n' >&2\n\
        printf 'Conversion failed!\\n' >&2";
    let program = fake_encoder(work.path(), body, 3);

    let mut recorder = Recorder::default();
    let err = VideoAssembler::new(EncoderSettings::with_program(&program))
        .assemble_with(&frames, &work.path().join("out.mp4"), 24, &mut recorder)
        .unwrap_err();

    match err {
        Error::EncoderFailed { code, diagnostics } => {
            assert_eq!(code, Some(3));
            assert_eq!(diagnostics, vec!["[out#0/mp4] Error opening output file"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(recorder.finished, None);
}

#[test]
fn missing_frames_are_not_found() {
    let work = tempdir().unwrap();
    let frames = work.path().join("frames");
    fs::create_dir_all(&frames).unwrap();
    fs::write(frames.join("notes.txt"), b"").unwrap();
    let program = fake_encoder(work.path(), PROGRESS_BODY, 0);

    let err = VideoAssembler::new(EncoderSettings::with_program(&program))
        .assemble(&frames, &work.path().join("out.mp4"), 24)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{err:?}");
    assert!(!work.path().join("args.txt").exists(), "encoder must not run");
}

#[test]
fn missing_encoder_binary_is_spawn_error() {
    let work = tempdir().unwrap();
    let frames = work.path().join("frames");
    write_frames(&frames, 1);

    let err = VideoAssembler::new(EncoderSettings::with_program(work.path().join("no-such-ffmpeg")))
        .assemble(&frames, &work.path().join("out.mp4"), 24)
        .unwrap_err();
    assert!(matches!(err, Error::Spawn { .. }), "{err:?}");
}

#[test]
fn version_check_reports_first_line() {
    let work = tempdir().unwrap();
    let program = fake_encoder(work.path(), "", 0);
    assert_eq!(probe::encoder_version(&program).unwrap(), "ffmpeg version 9.9-fake");
}

#[test]
fn version_check_rejects_failing_binary() {
    let work = tempdir().unwrap();
    let path = work.path().join("broken-ffmpeg");
    fs::write(&path, "#!/bin/sh\nexit 1\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    wait_until_executable(&path);

    let err = probe::encoder_version(&path).unwrap_err();
    assert!(matches!(err, Error::DependencyMissing(_)), "{err:?}");
}
