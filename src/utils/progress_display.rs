//! Terminal progress reporting
//!
//! Fraction-based progress indicator that overwrites the same line instead
//! of scrolling, plus a duration formatter for stage timing lines.

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Same-line progress bar driven by a fraction in `[0, 1]`.
pub struct ProgressBar {
    message: String,
    width: usize,
    start_time: Instant,
    last_update: Instant,
    update_interval: Duration,
}

impl ProgressBar {
    pub fn new(message: &str) -> Self {
        let now = Instant::now();
        Self {
            message: message.to_string(),
            width: 40,
            start_time: now,
            last_update: now.checked_sub(Duration::from_secs(1)).unwrap_or(now),
            update_interval: Duration::from_millis(100),
        }
    }

    /// Redraw at the given completion fraction. Redraws are rate-limited so
    /// per-record callers do not drown the terminal.
    pub fn update(&mut self, fraction: f64) {
        let now = Instant::now();
        if now.duration_since(self.last_update) < self.update_interval && fraction < 1.0 {
            return;
        }
        self.last_update = now;

        let fraction = fraction.clamp(0.0, 1.0);
        let filled = (fraction * self.width as f64) as usize;
        let bar: String = "=".repeat(filled) + &" ".repeat(self.width - filled);
        print!(
            "\r{} [{}] {:>5.1}% ({})",
            self.message,
            bar,
            fraction * 100.0,
            format_duration(self.start_time.elapsed())
        );
        let _ = io::stdout().flush();
    }

    /// Draw the full bar and move to the next line.
    pub fn finish(&mut self) {
        self.update(1.0);
        println!();
    }
}

/// Render a duration as `1h 02m 03s` / `2m 03s` / `4.213s`.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    if total_secs >= 3600 {
        format!(
            "{}h {:02}m {:02}s",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60
        )
    } else if total_secs >= 60 {
        format!("{}m {:02}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_ranges() {
        assert_eq!(format_duration(Duration::from_millis(4213)), "4.213s");
        assert_eq!(format_duration(Duration::from_secs(123)), "2m 03s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h 02m 03s");
    }

    #[test]
    fn test_progress_bar_clamps_fraction() {
        let mut bar = ProgressBar::new("test");
        bar.update(-0.5);
        bar.update(1.5);
        bar.finish();
    }
}
