//! Batch progress reporting with ETA estimation

use std::time::{Duration, Instant};

/// Progress reporter for a batch of known size.
///
/// Callers feed it the running count after each item; a status line is
/// printed every `report_interval` items and once on completion.
pub struct ProgressTracker {
    total: usize,
    start_time: Instant,
    label: String,
    report_interval: usize,
}

impl ProgressTracker {
    /// Creates a new progress tracker
    pub fn new(total: usize, label: &str) -> Self {
        let report_interval = (total / 20).max(1);
        Self {
            total,
            start_time: Instant::now(),
            label: label.to_string(),
            report_interval,
        }
    }

    /// Overrides how many items pass between two printed lines
    pub fn with_interval(mut self, report_interval: usize) -> Self {
        self.report_interval = report_interval.max(1);
        self
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn started_at(&self) -> Instant {
        self.start_time
    }

    /// Records that `current` items are done and prints a line when due
    pub fn report(&self, current: usize) {
        if current % self.report_interval == 0 || current == self.total {
            if let Some(line) = self.status_line(current, self.start_time.elapsed()) {
                println!("{}", line);
            }
        }
    }

    /// Renders the status line for `current` items after `elapsed`
    pub fn status_line(&self, current: usize, elapsed: Duration) -> Option<String> {
        let elapsed_secs = elapsed.as_secs_f64();

        if current == 0 || current > self.total {
            return None;
        }

        if current == self.total {
            return Some(format!(
                "  {} {}/{} (100.0%) - completed in {}",
                self.label,
                current,
                self.total,
                format_duration(elapsed_secs),
            ));
        }

        let percent = current as f64 / self.total as f64 * 100.0;
        let eta = if elapsed_secs > 0.0 {
            let rate = current as f64 / elapsed_secs;
            format_duration((self.total - current) as f64 / rate)
        } else {
            "--".to_string()
        };
        Some(format!(
            "  {} {}/{} ({:.1}%) - elapsed: {} - ETA: {}",
            self.label,
            current,
            self.total,
            percent,
            format_duration(elapsed_secs),
            eta,
        ))
    }
}

/// Formats seconds into a human-readable duration string
pub fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{}m {:.1}s", mins, remaining)
    } else {
        let hours = (secs / 3600.0).floor() as u64;
        let remaining = secs - (hours as f64 * 3600.0);
        let mins = (remaining / 60.0).floor() as u64;
        let remaining_secs = remaining - (mins as f64 * 60.0);
        format!("{}h {}m {:.0}s", hours, mins, remaining_secs)
    }
}
