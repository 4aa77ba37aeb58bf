//! Formatting utilities for sizes, durations, and batch summaries.

use console::Term;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Format a byte count with the largest fitting unit.
///
/// ```
/// use transmod_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration as `ms`, seconds, or minutes and seconds.
///
/// ```
/// use std::time::Duration;
/// use transmod_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print a short batch summary to stderr.
pub fn print_batch_summary(
    succeeded: usize,
    total: usize,
    formats: usize,
    bytes: u64,
    elapsed: Duration,
) {
    let width = Term::stderr().size().1 as usize;
    let rule = "─".repeat(width.clamp(20, 60));
    let failed = total - succeeded.min(total);

    eprintln!("{}", rule.dimmed());
    eprintln!(
        "  {} {} file(s) × {} format(s), {} in {}",
        "Built".bold(),
        succeeded.to_string().green(),
        formats,
        format_size(bytes).dimmed(),
        format_duration(elapsed).green()
    );
    if failed > 0 {
        eprintln!("  {} {}", "Failed".bold(), failed.to_string().red());
    }
    eprintln!("{}", rule.dimmed());
}
