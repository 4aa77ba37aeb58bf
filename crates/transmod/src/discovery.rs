//! Input discovery.
//!
//! Finds every file under the input root whose extension is in the batch's
//! extension list and that no ignore pattern matches.

use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use std::path::{Component, Path};
use tracing::debug;

use crate::{Error, Result};

/// Script and single-file-component extensions searched by default.
pub fn default_extensions() -> Vec<String> {
    ["js", "jsx", "ts", "tsx", "mjs", "vue", "svelte"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Test files, type declarations and `__tests__` directories.
pub fn default_ignore() -> Vec<String> {
    ["**/*.test.*", "**/*.spec.*", "**/*.d.ts", "**/__tests__/**"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Discover inputs below `cwd/root`.
///
/// Returns cwd-relative paths using `/` separators, sorted so that dispatch
/// order is stable across platforms. A missing root yields an empty list.
/// Hidden files and directories are skipped; `.gitignore` is not consulted.
///
/// `root` must be a single directory name: `.`, empty, nested or absolute
/// roots are rejected with [`Error::InvalidConfig`].
pub fn discover(
    cwd: &Path,
    root: &str,
    extensions: &[String],
    ignore: &[String],
) -> Result<Vec<String>> {
    check_root(root)?;

    let search_root = cwd.join(root);
    if !search_root.is_dir() {
        debug!("[transmod] input root {} does not exist", search_root.display());
        return Ok(Vec::new());
    }

    let excludes = build_excludes(cwd, ignore)?;

    let walker = WalkBuilder::new(&search_root)
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .overrides(excludes)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::Discovery(e.to_string()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext));
        if !matches_ext {
            continue;
        }

        let relative = path.strip_prefix(cwd).map_err(|_| {
            Error::Discovery(format!(
                "{} is outside the working directory",
                path.display()
            ))
        })?;
        files.push(relative.to_string_lossy().replace('\\', "/"));
    }

    files.sort();
    debug!("[transmod] discovered {} files under {}", files.len(), root);
    Ok(files)
}

/// Output names drop exactly one leading segment, and a root of `.` would
/// walk earlier output back in as input.
fn check_root(root: &str) -> Result<()> {
    let mut components = Path::new(root).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::InvalidConfig(format!(
            "input root '{}' must be a single directory name under the working directory",
            root
        ))),
    }
}

/// Ignore patterns become negated overrides, so anything they match is
/// skipped and everything else is left to the extension filter.
fn build_excludes(cwd: &Path, patterns: &[String]) -> Result<Override> {
    let mut builder = OverrideBuilder::new(cwd);
    for pattern in patterns {
        builder
            .add(&format!("!{}", pattern))
            .map_err(|e| Error::Discovery(format!("invalid ignore pattern '{}': {}", pattern, e)))?;
    }
    builder
        .build()
        .map_err(|e| Error::Discovery(e.to_string()))
}
