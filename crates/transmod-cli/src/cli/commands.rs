use clap::{Args, Subcommand};
use regex::Regex;
use std::path::PathBuf;
use transmod::FormatSpec;

use crate::cli::enums::*;
use crate::cli::validation::{parse_extension, parse_format_spec, parse_regex, parse_timeout};

/// Available transmod subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile every input file into every requested format
    ///
    /// Each (file, format) pair is built on its own, at most ten files at a
    /// time. A file that fails to build is reported and the rest carry on;
    /// the exit status is non-zero if any file failed.
    Build(BuildArgs),

    /// List discovered inputs and their output paths
    ///
    /// Runs discovery with the same flags as `build` and prints where each
    /// file would be written, without compiling anything.
    List(ListArgs),
}

/// Flags shared by every command that discovers inputs.
#[derive(Args, Debug, Clone, Default)]
pub struct DiscoveryArgs {
    /// Directory searched for inputs, relative to the working directory
    ///
    /// Also stripped from output paths: `src/util/math.ts` is written to
    /// `<outDir>/util/math.js`. Defaults to `src`.
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Output format, repeatable
    ///
    /// Either a bare tag (`es`, `cjs`) or `format:outDir`. A bare `cjs`
    /// writes to `lib/`, a bare `es` to `es/`. Defaults to both.
    #[arg(short, long = "format", value_name = "SPEC", value_parser = parse_format_spec)]
    pub formats: Vec<FormatSpec>,

    /// File extension to include, repeatable (with or without the dot)
    ///
    /// Defaults to js, jsx, ts, tsx, mjs, vue and svelte.
    #[arg(long = "ext", value_name = "EXT", value_parser = parse_extension)]
    pub extensions: Vec<String>,

    /// Glob to exclude, repeatable, relative to the working directory
    ///
    /// Replaces the default set (tests, specs, declaration files and
    /// `__tests__` directories).
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Path to a config file
    ///
    /// Defaults to `transmod.config.json` in the working directory, if present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory
    ///
    /// Inputs, outputs and the default config file are resolved against it.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Package name to keep external, repeatable
    ///
    /// Subpath imports (`lodash/fp`) of a listed package are external too.
    #[arg(short, long, value_name = "ID")]
    pub external: Vec<String>,

    /// Regular expression; matching imports are kept external
    #[arg(long, value_name = "REGEX", value_parser = parse_regex)]
    pub external_pattern: Option<Regex>,

    /// Minify output
    #[arg(long)]
    pub minify: bool,

    /// Write a `.map` file next to each output
    #[arg(long)]
    pub sourcemap: bool,

    /// Target platform
    #[arg(long, value_enum)]
    pub platform: Option<Platform>,

    /// Abort any single file's build after this many seconds
    #[arg(long, value_name = "SECS", value_parser = parse_timeout)]
    pub timeout: Option<u64>,

    /// Rebuild whenever a file under the input root changes
    #[arg(short, long)]
    pub watch: bool,
}

/// Arguments for the list command
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}
