//! Error handling for the transmod CLI.
//!
//! - [`CliError`] is what commands return.
//! - [`ConfigError`] and [`BuildError`] carry the detail, each with a hint
//!   on how to fix it.
//! - Library errors pass through as [`CliError::Core`] and keep their
//!   `miette` diagnostic codes.
//!
//! ```rust,no_run
//! use transmod_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_config(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Check the --config path")
//! }
//! ```

mod report;

use std::path::PathBuf;
use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration errors (missing file, bad field, conflicting values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Batch-level build errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors from the transmod library
    #[error(transparent)]
    Core(#[from] transmod::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--config` points at a file that does not exist
    #[error("Config file not found: {}\n\nHint: Create transmod.config.json or fix the --config path", .0.display())]
    NotFound(PathBuf),

    /// Layers could not be merged into a valid configuration
    #[error("Invalid configuration: {0}\n\nHint: Check transmod.config.json and TRANSMOD_* variables for unknown fields or wrong types")]
    Extract(String),

    /// Mutually exclusive settings
    #[error("Conflicting options: {0}\n\nHint: These options cannot be used together")]
    ConflictingOptions(String),

    /// A field has an unusable value
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field
        field: String,
        /// The rejected value
        value: String,
        /// How to fix it
        hint: String,
    },
}

/// Batch-level build errors.
///
/// Failures of single files are reported as they happen; these describe the
/// batch as a whole.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Some files failed to build
    #[error("{failed} of {total} file(s) failed to build\n\nHint: Run with --verbose for bundler diagnostics")]
    UnitsFailed {
        /// Number of failed files
        failed: usize,
        /// Number of discovered files
        total: usize,
    },

    /// The batch was interrupted
    #[error("Build cancelled after {succeeded} of {total} file(s)")]
    Cancelled {
        /// Files built before the interrupt
        succeeded: usize,
        /// Number of discovered files
        total: usize,
    },

    /// Input root is not a directory
    #[error("Input root is not a directory: {}\n\nHint: Set --root or \"root\" in transmod.config.json", .0.display())]
    RootNotDirectory(PathBuf),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found() {
        let msg = ConfigError::NotFound(PathBuf::from("transmod.config.json")).to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("transmod.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_units_failed_message() {
        let msg = BuildError::UnitsFailed {
            failed: 2,
            total: 7,
        }
        .to_string();
        assert!(msg.starts_with("2 of 7 file(s) failed"));
        assert!(msg.contains("--verbose"));
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: CliError = transmod::Error::Discovery("bad glob".into()).into();
        assert_eq!(err.to_string(), "Discovery failed: bad glob");
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let err: CliError = ConfigError::ConflictingOptions("x".into()).into();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let err = result.with_path("/project/transmod.config.json").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_with_hint() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::NotFound(PathBuf::from("a.json")));

        let err = result.with_hint("Try creating the file").unwrap_err();
        assert!(err.to_string().contains("Hint: Try creating the file"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), BuildError> =
            Err(BuildError::RootNotDirectory(PathBuf::from("src")));

        let err = result.context("Watching inputs").unwrap_err();
        assert!(err.to_string().starts_with("Watching inputs: "));
    }
}
