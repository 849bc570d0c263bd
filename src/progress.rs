//! Progress display for per-dependency lookups
//!
//! Drawn on stderr by indicatif; disabled for `--json` and `--quiet`.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for registry and package manager lookups
pub struct Progress {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a new progress reporter
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Create a disabled progress reporter
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Show a spinner for a single long-running call (audit, depcheck)
    pub fn spinner(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .expect("static spinner template");
        self.show(ProgressBar::new_spinner(), style, message, 80);
    }

    /// Start a bar over a known number of packages
    pub fn start(&mut self, total: u64, message: &str) {
        if !self.enabled || total == 0 {
            return;
        }

        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .expect("static progress template")
            .progress_chars("█▓▒░");
        self.show(ProgressBar::new(total), style, message, 100);
    }

    fn show(&mut self, bar: ProgressBar, style: ProgressStyle, message: &str, tick_ms: u64) {
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(tick_ms));
        // a new bar replaces, and clears, any previous one
        self.finish_and_clear();
        self.bar = Some(bar);
    }

    /// Count one finished package
    pub fn inc(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Remove the bar before the report is printed
    pub fn finish_and_clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::disabled()
    }
}
