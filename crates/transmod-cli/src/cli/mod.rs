//! Command-line interface definition.
//!
//! # Command Structure
//!
//! - `transmod build` - compile every input file into every format
//! - `transmod list` - show what `build` would produce, without building

mod commands;
pub mod enums;
mod validation;

use clap::Parser;

pub use commands::{BuildArgs, Command, DiscoveryArgs, ListArgs};
pub use enums::*;
pub use validation::{parse_extension, parse_format_spec, parse_regex, parse_timeout};

/// transmod - per-file library builds
#[derive(Parser, Debug)]
#[command(
    name = "transmod",
    version,
    about = "Compile a source tree file by file into CommonJS and ES modules",
    long_about = "transmod compiles every file under an input root on its own, once per\n\
                  requested module format. The directory layout is mirrored into each\n\
                  format's output directory (lib/ for CommonJS, es/ for ES modules by default),\n\
                  so consumers can deep-import single modules."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Prints one line per built file and every bundler diagnostic.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
