//! Shared helpers for command implementations.

use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::TransmodConfig;
use crate::error::{BuildError, CliError, Result, ResultExt};
use crate::ui;

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Working directory for a command: `--cwd` (relative to the process
/// directory) or the process directory itself.
pub fn resolve_cwd(explicit: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    let Some(path) = explicit else {
        return Ok(current);
    };

    let requested = resolve_path(path, &current);
    let cwd = requested.canonicalize().with_path(&requested)?;
    if !cwd.is_dir() {
        return Err(CliError::FileNotFound(cwd));
    }
    Ok(cwd)
}

/// Check the input root before a batch.
///
/// Returns `false` (after a warning) when it does not exist, which yields
/// an empty batch rather than an error.
pub fn check_input_root(config: &TransmodConfig, cwd: &Path) -> Result<bool> {
    let root = cwd.join(config.input_root());
    if !root.exists() {
        ui::warning(&format!(
            "Input root '{}' does not exist; nothing to build",
            config.input_root()
        ));
        return Ok(false);
    }
    if !root.is_dir() {
        return Err(BuildError::RootNotDirectory(root).into());
    }
    Ok(true)
}

/// Cancel `token` on Ctrl-C. Abort the handle once the work is done.
pub fn cancel_on_interrupt(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ui::warning("Interrupted, cancelling remaining files...");
            token.cancel();
        }
    })
}
