//! transmod CLI entry point.
//!
//! Parses arguments, sets up logging and colors, then dispatches to the
//! selected command.

use clap::Parser;
use miette::Result;
use transmod_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors();

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
        cli::Command::List(list_args) => commands::list_execute(list_args).await,
    };

    // Non-zero exit on any error, including a batch with failed units
    result.map_err(error::cli_error_to_miette)
}
