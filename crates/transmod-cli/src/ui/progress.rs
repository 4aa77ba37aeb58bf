//! Progress bar for one batch.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Progress of one batch, driven by the batch's lifecycle callbacks.
///
/// Cheap to clone; clones update the same bar. Draws to stderr and hides
/// itself when stderr is not a terminal or in CI.
#[derive(Clone)]
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), Self::draw_target());
        bar.set_style(Self::style());
        Self { bar }
    }

    /// A bar that never draws.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    fn draw_target() -> ProgressDrawTarget {
        if super::is_ci() {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    /// `on_start`: the total is known.
    pub fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    /// `on_success`: one more file built.
    pub fn file_done(&self, count: usize, file: &str) {
        self.bar.set_position(count as u64);
        self.bar.set_message(format!("{}", file.dimmed()));
    }

    /// Print a line above the bar without breaking it.
    pub fn println(&self, message: impl AsRef<str>) {
        self.bar.println(message);
    }

    /// Remove the bar; the summary is printed separately.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for BatchProgress {
    fn default() -> Self {
        Self::new()
    }
}
