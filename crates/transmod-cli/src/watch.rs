//! Input watching for `transmod build --watch`.
//!
//! Watches the input root recursively and forwards changes to relevant
//! source files. Bursts of events (editors writing temp files, `git
//! checkout`) are collapsed into one change set before a rebuild.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::{CliError, Result, ResultExt};

/// Quiet period that ends a burst of changes.
pub const DEBOUNCE: Duration = Duration::from_millis(150);

/// Recursive watcher over one input root.
pub struct InputWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl InputWatcher {
    /// Start watching `root`. Changed paths with one of `extensions` are
    /// sent on the returned channel; removals are always sent, since a
    /// removed directory carries no extension.
    pub fn new(root: PathBuf, extensions: Vec<String>) -> Result<(Self, mpsc::Receiver<PathBuf>)> {
        if !root.is_dir() {
            return Err(CliError::FileNotFound(root));
        }

        let (tx, rx) = mpsc::channel(100);
        // Events carry canonical paths (e.g. /private/var on macOS).
        let watch_root = root.canonicalize().unwrap_or_else(|_| root.clone());

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("[transmod] watch error: {}", e);
                    return;
                }
            };

            let removal = matches!(event.kind, EventKind::Remove(_));
            if !removal && !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }

            for path in event.paths {
                if Self::is_relevant(&path, &watch_root, &extensions, removal) {
                    // Receiver gone means the watch loop ended.
                    if tx.blocking_send(path).is_err() {
                        return;
                    }
                }
            }
        })
        .context("Creating file watcher")?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .with_hint("Check that the input root is readable")?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    fn is_relevant(path: &Path, root: &Path, extensions: &[String], removal: bool) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };

        let hidden = relative
            .components()
            .any(|c| c.as_os_str().to_str().is_some_and(|name| name.starts_with('.')));
        if hidden {
            return false;
        }

        if removal {
            return true;
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Wait for the next burst of changes and return its distinct paths.
///
/// Returns `None` once the watcher has shut down.
pub async fn next_change_set(
    changes: &mut mpsc::Receiver<PathBuf>,
    debounce: Duration,
) -> Option<Vec<PathBuf>> {
    let first = changes.recv().await?;
    let mut paths = BTreeSet::from([first]);

    loop {
        match tokio::time::timeout(debounce, changes.recv()).await {
            Ok(Some(path)) => {
                paths.insert(path);
            }
            // Quiet period elapsed, or the sender is gone.
            Ok(None) | Err(_) => break,
        }
    }

    Some(paths.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec!["ts".to_string(), "vue".to_string()]
    }

    #[test]
    fn test_relevant_source_file() {
        let root = PathBuf::from("/project/src");
        assert!(InputWatcher::is_relevant(
            Path::new("/project/src/util/math.ts"),
            &root,
            &exts(),
            false
        ));
        assert!(!InputWatcher::is_relevant(
            Path::new("/project/src/readme.md"),
            &root,
            &exts(),
            false
        ));
    }

    #[test]
    fn test_outside_root_and_hidden_ignored() {
        let root = PathBuf::from("/project/src");
        assert!(!InputWatcher::is_relevant(
            Path::new("/project/lib/a.ts"),
            &root,
            &exts(),
            false
        ));
        assert!(!InputWatcher::is_relevant(
            Path::new("/project/src/.cache/a.ts"),
            &root,
            &exts(),
            false
        ));
    }

    #[test]
    fn test_removals_pass_without_extension() {
        let root = PathBuf::from("/project/src");
        assert!(InputWatcher::is_relevant(
            Path::new("/project/src/components"),
            &root,
            &exts(),
            true
        ));
    }

    #[tokio::test]
    async fn test_change_set_collapses_burst() {
        let (tx, mut rx) = mpsc::channel(10);
        tx.send(PathBuf::from("b.ts")).await.unwrap();
        tx.send(PathBuf::from("a.ts")).await.unwrap();
        tx.send(PathBuf::from("b.ts")).await.unwrap();

        let set = next_change_set(&mut rx, Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(set, vec![PathBuf::from("a.ts"), PathBuf::from("b.ts")]);
    }

    #[tokio::test]
    async fn test_change_set_none_when_closed() {
        let (tx, mut rx) = mpsc::channel::<PathBuf>(1);
        drop(tx);
        assert!(next_change_set(&mut rx, DEBOUNCE).await.is_none());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let result = InputWatcher::new(PathBuf::from("/definitely/not/here"), exts());
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }
}
