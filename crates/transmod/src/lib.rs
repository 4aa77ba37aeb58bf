#![cfg_attr(docsrs, feature(doc_cfg))]

//! # transmod
//!
//! Per-file library builds on top of Rolldown.
//!
//! transmod walks a source tree and compiles every file on its own into one
//! or more module formats (CommonJS under `lib/`, ES modules under `es/` by
//! default). Each (file, format) pair is an independent build unit. Units run
//! through a bounded pool, and one failing file never aborts the batch.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use transmod::{BatchOptions, FormatSpec, ModuleFormat, RolldownBundler, run_batch};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = BatchOptions::new(".")
//!     .formats([
//!         FormatSpec::from(ModuleFormat::Cjs),
//!         FormatSpec::target(ModuleFormat::Es, "esm"),
//!     ])
//!     .on_success(|count, file| println!("{count}: {file}"));
//!
//! let result = run_batch(Arc::new(RolldownBundler::new()), options).await?;
//! println!("built {}/{} files", result.succeeded, result.total);
//! # Ok(()) }
//! ```
//!
//! ## Pipeline
//!
//! discovery → per-file config synthesis → external classification →
//! bounded dispatch → per-format output path resolution → aggregate report.

pub mod bundler;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod driver;
pub mod external;
pub mod format;
pub mod minify;
pub mod options;
pub mod orchestrator;
pub mod paths;
pub mod plugins;
pub mod pool;
pub mod rolldown_engine;

// Re-export core Rolldown types for library users
pub use rolldown::{OutputFormat, Platform};
pub use rolldown_common::ModuleType;

// Re-export plugin types for plugin authors
pub use rolldown_plugin::{
    __inner::SharedPluginable, HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs,
    HookResolveIdOutput, HookResolveIdReturn, HookTransformArgs, HookTransformOutput,
    HookTransformReturn, HookUsage, Plugin, PluginContext, SharedTransformPluginContext,
};

pub use bundler::{Bundler, EmittedFile, EmittedKind};
pub use config::{BuildConfiguration, BuildJob, BuildMode, LibraryStub, OutputOptions, synthesize};
pub use discovery::{default_extensions, default_ignore, discover};
pub use driver::{OutputRecord, drive_job, drive_one};
pub use external::{Disposition, ExternalClassifier, ExternalOption, ExternalQuery, default_policy};
pub use format::{FormatSpec, ModuleFormat, ResolvedFormat, default_formats};
pub use minify::MinifyLevel;
pub use options::{BatchCallbacks, BatchOptions, BuildOverride, OutputOverride, Resolver};
pub use orchestrator::{BATCH_CONCURRENCY, BatchResult, UnitFailure, run_batch};
pub use paths::{normalize_path, resolve_output_path, same_path};
pub use plugins::{HookPlugin, PluginHooks};
pub use pool::{PoolReport, UnitOutcome, run_bounded};
pub use rolldown_engine::RolldownBundler;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

/// Error types for transmod operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from the underlying bundler.
    #[error("Bundler error: {}", format_bundler_error(.0))]
    Bundler(Vec<diagnostics::ExtractedDiagnostic>),

    /// Input discovery failed (bad glob, unreadable root).
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// A caller-supplied override resolver failed for one file.
    #[error("Override for '{file}' failed: {message}")]
    Override { file: String, message: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// A build unit exceeded the per-unit timeout.
    #[error("Build of '{file}' timed out after {seconds:.1}s")]
    Timeout { file: String, seconds: f64 },

    /// The batch was cancelled before or while this unit ran.
    #[error("Build of '{0}' was cancelled")]
    Cancelled(String),

    /// The task running a build unit panicked.
    #[error("Build task panicked: {0}")]
    Panicked(String),
}

/// Result type alias for transmod operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bundler error from a Rolldown error.
    ///
    /// Extracts structured diagnostics from Rolldown's error types.
    pub fn from_rolldown_batch(error: &dyn std::fmt::Debug) -> Self {
        Error::Bundler(diagnostics::extract_from_rolldown_error(error))
    }

    /// Shorthand for a single-message bundler failure.
    pub fn bundler_message(message: impl Into<String>) -> Self {
        Error::Bundler(vec![diagnostics::ExtractedDiagnostic::error(message)])
    }
}

/// Format bundler error diagnostics for display.
fn format_bundler_error(diagnostics: &[diagnostics::ExtractedDiagnostic]) -> String {
    match diagnostics {
        [] => "Unknown bundler error".to_string(),
        [diag] => format!("{}: {}", diag.kind, diag.message),
        many => format!(
            "{} errors: {}",
            many.len(),
            many.iter()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::Discovery(_) => "DISCOVERY_ERROR",
            Error::Override { .. } => "OVERRIDE_ERROR",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Io(_) => "IO_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::Timeout { .. } => "TIMEOUT",
            Error::Cancelled(_) => "CANCELLED",
            Error::Panicked(_) => "PANIC",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Discovery(_) => Some(Box::new(
                "Check the input root exists and that ignore patterns are valid globs.",
            )),
            Error::Override { .. } => Some(Box::new(
                "A build or output override returned an error for this file. Other files are unaffected.",
            )),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Emitted files must stay inside the format's output directory.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            Error::Timeout { .. } => Some(Box::new(
                "Raise the per-unit timeout or look for a plugin that never resolves.",
            )),
            Error::Panicked(_) => Some(Box::new("This is a bug in transmod. Please report it.")),
            Error::Bundler(diagnostics) => match diagnostics.as_slice() {
                [diag] => diag
                    .help
                    .as_ref()
                    .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>),
                _ => Some(Box::new(
                    "Multiple bundler errors occurred. See details below.".to_string(),
                )),
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn test_bundler_error_display_single() {
        let err = Error::bundler_message("Unexpected token");
        assert_eq!(err.to_string(), "Bundler error: BuildFailure: Unexpected token");
    }

    #[test]
    fn test_bundler_error_display_empty() {
        let err = Error::Bundler(Vec::new());
        assert!(err.to_string().contains("Unknown bundler error"));
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = Error::Cancelled("src/a.ts".into());
        assert_eq!(err.code().unwrap().to_string(), "CANCELLED");

        let err = Error::Timeout {
            file: "src/a.ts".into(),
            seconds: 1.5,
        };
        assert_eq!(err.code().unwrap().to_string(), "TIMEOUT");
        assert!(err.to_string().contains("1.5s"));
    }

    #[test]
    fn test_override_error_has_help() {
        let err = Error::Override {
            file: "src/a.ts".into(),
            message: "boom".into(),
        };
        assert!(err.help().is_some());
        assert!(err.to_string().contains("src/a.ts"));
    }
}
