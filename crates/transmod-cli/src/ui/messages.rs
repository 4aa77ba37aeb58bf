//! One-line status messages on stderr.
//!
//! Progress bars draw on stderr too, so while a bar is live route output
//! through [`BatchProgress::println`](super::BatchProgress::println) instead.

use owo_colors::OwoColorize;

pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Yellow, for conditions that do not fail the run (missing input root,
/// interrupted batch).
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Red cross plus message. The watch loop prints one per failed round.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}
