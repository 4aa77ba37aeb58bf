//! Conversion of CLI errors into `miette` reports.

use miette::Report;

use crate::error::{BuildError, CliError};

/// Convert a [`CliError`] into a report for `main`.
///
/// Library errors keep their diagnostic code and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Core(e) => Report::new(e),
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        other => miette::miette!("{}", other),
    }
}

fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::UnitsFailed { failed, total } => miette::miette!(
            code = "UNITS_FAILED",
            help = "Run with --verbose for bundler diagnostics",
            "{} of {} file(s) failed to build",
            failed,
            total
        ),
        other => miette::miette!("{}", other),
    }
}
