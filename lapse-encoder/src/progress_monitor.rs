//! Encoder progress parsed from diagnostic text
//!
//! The monitor does no I/O of its own: it updates its counters from each line
//! and hands a snapshot to a [`ProgressSink`] at most once per second.

use indicatif::{ProgressBar, ProgressStyle};
use lapse_core::progress_tracker::format_duration;
use regex::Regex;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

static FRAME_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"frame=\s*(\d+)").expect("frame marker pattern is valid"));

/// Minimum wall-clock time between two visible updates
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Derived progress figures at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub current: u64,
    pub total: u64,
    pub percent: f64,
    /// Average frames per second since the encoder started
    pub fps: f64,
    /// Seconds left at the current rate, unknown while nothing has been encoded
    pub eta_secs: Option<f64>,
}

/// Receiver of throttled progress updates
pub trait ProgressSink {
    fn update(&mut self, snapshot: &ProgressSnapshot);

    /// Called once when the encoder finished successfully
    fn finish(&mut self, _total: u64) {}
}

const BAR_TEMPLATE: &str =
    "Encoding video [{bar:40.cyan/blue}] {percent:>3}% (frame {pos}/{len}) {msg}";

/// Console progress bar for the encoder
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    /// Bar drawn on the terminal; its length is set by the first update
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Bar that tracks state without drawing
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    pub fn with_bar(bar: ProgressBar) -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .map(|style| style.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    /// Rate and ETA shown next to the bar
    pub fn message(snapshot: &ProgressSnapshot) -> String {
        let eta = snapshot
            .eta_secs
            .map(format_duration)
            .unwrap_or_else(|| "--".to_string());
        format!("FPS: {:.1} ETA: {}", snapshot.fps, eta)
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn update(&mut self, snapshot: &ProgressSnapshot) {
        self.bar.set_length(snapshot.total);
        self.bar.set_position(snapshot.current);
        self.bar.set_message(Self::message(snapshot));
    }

    fn finish(&mut self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(total);
        self.bar.finish_with_message("complete");
    }
}

/// Tracks how far the encoder got through a sequence of known length
pub struct EncoderProgressMonitor<S: ProgressSink> {
    total_frames: u64,
    current_frame: u64,
    start_time: Instant,
    last_update_time: Instant,
    sink: S,
}

impl<S: ProgressSink> EncoderProgressMonitor<S> {
    /// Creates a monitor whose clock starts now
    pub fn new(total_frames: u64, sink: S) -> Self {
        Self::started_at(total_frames, sink, Instant::now())
    }

    /// Creates a monitor whose clock started at `start_time`
    pub fn started_at(total_frames: u64, sink: S, start_time: Instant) -> Self {
        Self {
            total_frames,
            current_frame: 0,
            start_time,
            last_update_time: start_time,
            sink,
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn percent(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.current_frame as f64 / self.total_frames as f64 * 100.0
    }

    /// Progress figures as of `now`
    pub fn snapshot_at(&self, now: Instant) -> ProgressSnapshot {
        let elapsed = now.saturating_duration_since(self.start_time).as_secs_f64();
        let fps = if elapsed > 0.0 {
            self.current_frame as f64 / elapsed
        } else {
            0.0
        };
        let remaining = (self.total_frames as f64 - self.current_frame as f64).max(0.0);
        let eta_secs = (fps > 0.0).then(|| remaining / fps);

        ProgressSnapshot {
            current: self.current_frame,
            total: self.total_frames,
            percent: self.percent(),
            fps,
            eta_secs,
        }
    }

    /// Feeds one line of encoder output
    pub fn observe(&mut self, line: &str) {
        self.observe_at(line, Instant::now());
    }

    /// Feeds one line of encoder output received at `now`
    pub fn observe_at(&mut self, line: &str, now: Instant) {
        let Some(frame) = parse_frame_marker(line) else {
            return;
        };
        // Taken as reported; a restarted pass may move it backwards.
        self.current_frame = frame;

        if now.saturating_duration_since(self.last_update_time) >= REFRESH_INTERVAL {
            let snapshot = self.snapshot_at(now);
            self.sink.update(&snapshot);
            self.last_update_time = now;
        }
    }

    /// Reports successful completion to the sink
    pub fn finish(&mut self) {
        self.sink.finish(self.total_frames);
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Extracts the frame count from a `frame=<digits>` marker.
///
/// Lines without the marker, or whose value is not a valid count, yield
/// `None`; the latter are logged at debug level.
pub fn parse_frame_marker(line: &str) -> Option<u64> {
    let captures = FRAME_MARKER.captures(line)?;
    let value = captures.get(1)?.as_str();
    match value.parse::<u64>() {
        Ok(frame) => Some(frame),
        Err(e) => {
            log::debug!("Ignoring unparsable frame marker {:?} ({}) in line: {}", value, e, line);
            None
        }
    }
}
