//! Terminal output: status lines, the batch progress bar, and formatting.
//!
//! Everything goes to stderr so `transmod list --json` stays pipeable.
//!
//! ```no_run
//! use transmod_cli::ui;
//!
//! ui::init_colors();
//! let progress = ui::BatchProgress::new();
//! progress.start(3);
//! progress.file_done(1, "src/a.ts");
//! progress.finish();
//! ui::success("Built 3 files");
//! ```

mod format;
mod messages;
mod progress;

pub use format::{format_duration, format_size, print_batch_summary};
pub use messages::{error, info, success, warning};
pub use progress::BatchProgress;

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins, then `FORCE_COLOR`, then whether stderr is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::user_attended_stderr()
}

/// Apply the color decision to `console`-styled output (the library's
/// failure line and the progress bar).
pub fn init_colors() {
    console::set_colors_enabled_stderr(should_use_color());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_is_ci_with_ci_var() {
        unsafe { std::env::set_var("CI", "true") };
        assert!(is_ci());
        unsafe { std::env::remove_var("CI") };
    }

    #[test]
    #[serial]
    fn test_should_use_color_no_color_overrides_force() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_color());
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn test_should_use_color_force_color() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(should_use_color());
        unsafe { std::env::remove_var("FORCE_COLOR") };
    }
}
