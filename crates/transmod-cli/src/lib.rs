//! transmod CLI - per-file library builds from the command line.
//!
//! Wraps the `transmod` library: every file under the input root is compiled
//! on its own into each requested module format.
//!
//! # Architecture
//!
//! - [`cli`] - clap argument definitions and value parsers
//! - [`commands`] - `build` and `list`
//! - [`config`] - `transmod.config.json` + `TRANSMOD_*` + flag layering
//! - [`error`] - error types with actionable hints
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines, progress bar and formatting
//! - [`watch`] - rebuild on change
//!
//! # Example
//!
//! ```rust
//! use transmod_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;
pub mod watch;

pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
