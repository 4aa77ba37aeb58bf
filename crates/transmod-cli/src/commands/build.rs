//! `transmod build`.
//!
//! Loads the layered configuration, runs one batch through Rolldown, and
//! either exits with the batch outcome or, with `--watch`, keeps rebuilding
//! until interrupted.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use transmod::{BatchResult, RolldownBundler, run_batch};

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::config::{CliOverrides, TransmodConfig};
use crate::error::{BuildError, Result};
use crate::ui;
use crate::watch::{DEBOUNCE, InputWatcher, next_change_set};

/// Execute the build command.
///
/// # Errors
///
/// - invalid configuration or flags
/// - discovery failure (e.g. an invalid ignore glob)
/// - [`BuildError::UnitsFailed`] when any file failed; all other files are
///   still built and written
pub async fn execute(args: BuildArgs) -> Result<()> {
    let cwd = utils::resolve_cwd(args.discovery.cwd.as_deref())?;
    let config = TransmodConfig::load(
        &CliOverrides::from_build_args(&args),
        &cwd,
        args.discovery.config.as_deref(),
    )?;

    if config.watch {
        return watch(&config, &cwd).await;
    }

    if !utils::check_input_root(&config, &cwd)? {
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let interrupt = utils::cancel_on_interrupt(cancel.clone());
    let result = build_once(&config, &cwd, cancel).await;
    interrupt.abort();

    check_outcome(&result?)
}

/// Run one batch with a progress bar and print its summary.
pub(crate) async fn build_once(
    config: &TransmodConfig,
    cwd: &Path,
    cancel: CancellationToken,
) -> Result<BatchResult> {
    let start = Instant::now();
    let progress = ui::BatchProgress::new();

    let options = config
        .to_batch_options(cwd)?
        .cancel_token(cancel)
        .on_start({
            let progress = progress.clone();
            move |total| progress.start(total)
        })
        .on_success({
            let progress = progress.clone();
            move |count, file| progress.file_done(count, file)
        });

    let result = run_batch(Arc::new(RolldownBundler::new()), options).await;
    progress.finish();
    let result = result?;

    if result.total == 0 {
        ui::warning(&format!(
            "No files matched under '{}' (extensions: {})",
            config.input_root(),
            config.normalized_extensions().join(", ")
        ));
    } else {
        ui::print_batch_summary(
            result.succeeded,
            result.total,
            config.formats.len(),
            result.bytes_written,
            start.elapsed(),
        );
    }

    Ok(result)
}

/// Map a finished batch to the command's exit status.
pub(crate) fn check_outcome(result: &BatchResult) -> Result<()> {
    if result.cancelled {
        return Err(BuildError::Cancelled {
            succeeded: result.succeeded,
            total: result.total,
        }
        .into());
    }

    if result.failed {
        return Err(BuildError::UnitsFailed {
            failed: result.failures.len(),
            total: result.total,
        }
        .into());
    }

    ui::success(&format!("Built {} file(s)", result.succeeded));
    Ok(())
}

/// Build, then rebuild after every burst of changes under the input root.
///
/// Failed rounds are reported and the watch carries on. Ctrl-C cancels the
/// round in flight and ends the watch.
async fn watch(config: &TransmodConfig, cwd: &Path) -> Result<()> {
    let root = cwd.join(config.input_root());
    if !root.is_dir() {
        return Err(BuildError::RootNotDirectory(root).into());
    }

    let (watcher, mut changes) = InputWatcher::new(root, config.normalized_extensions())?;
    let stop = CancellationToken::new();
    let interrupt = utils::cancel_on_interrupt(stop.clone());

    ui::info(&format!(
        "Watching {} for changes (Ctrl-C to stop)",
        watcher.root().display()
    ));
    run_round(config, cwd, &stop).await;

    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            changed = next_change_set(&mut changes, DEBOUNCE) => {
                let Some(paths) = changed else { break };
                match paths.as_slice() {
                    [one] => ui::info(&format!("Changed: {}", one.display())),
                    many => ui::info(&format!("{} files changed", many.len())),
                }
                run_round(config, cwd, &stop).await;
            }
        }
    }

    interrupt.abort();
    ui::info("Stopped watching");
    Ok(())
}

async fn run_round(config: &TransmodConfig, cwd: &Path, stop: &CancellationToken) {
    let outcome = match build_once(config, cwd, stop.child_token()).await {
        Ok(result) => check_outcome(&result),
        Err(e) => Err(e),
    };
    if let Err(e) = outcome {
        ui::error(&e.to_string());
    }
}
