//! Output path resolution and path identity.

use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// Extension appended to every compiled output.
pub const OUTPUT_EXTENSION: &str = "js";

/// Single-file-component extensions. Their extension is part of the
/// output name (`Comp.vue` → `Comp.vue.js`).
pub const SFC_EXTENSIONS: &[&str] = &["vue", "svelte"];

/// Compute the root-relative output name for a discovered input.
///
/// The first path segment (the input root) is stripped, then the extension is
/// swapped for `.js`. Single-file components keep their extension and get
/// `.js` appended instead.
///
/// ```
/// use transmod::resolve_output_path;
///
/// assert_eq!(resolve_output_path("src/util/math.ts"), "util/math.js");
/// assert_eq!(resolve_output_path("src/Comp.vue"), "Comp.vue.js");
/// assert_eq!(resolve_output_path("src\\nested\\a.jsx"), "nested/a.js");
/// ```
pub fn resolve_output_path(relative: &str) -> String {
    let relative = relative.replace('\\', "/");
    let stripped = match relative.split_once('/') {
        Some((_, rest)) => rest,
        None => relative.as_str(),
    };

    let (dir, file) = match stripped.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, stripped),
    };

    let file = match file.rsplit_once('.') {
        Some((_, ext)) if SFC_EXTENSIONS.contains(&ext) => {
            format!("{}.{}", file, OUTPUT_EXTENSION)
        }
        // Leading dot is a hidden file, not an extension.
        Some((stem, _)) if !stem.is_empty() => format!("{}.{}", stem, OUTPUT_EXTENSION),
        _ => format!("{}.{}", file, OUTPUT_EXTENSION),
    };

    match dir {
        Some(dir) => format!("{}/{}", dir, file),
        None => file,
    }
}

/// Canonical comparison key for a path.
///
/// Separators become `/`, `.`/`..` segments are folded and, on platforms
/// with case-insensitive filesystems, the key is lowercased. Does not touch
/// the filesystem.
pub fn normalize_path(path: impl AsRef<Path>) -> String {
    let raw = path.as_ref().to_string_lossy().replace('\\', "/");
    let cleaned = PathBuf::from(raw).clean();
    let key = cleaned.to_string_lossy().replace('\\', "/");

    if cfg!(any(windows, target_os = "macos")) {
        key.to_lowercase()
    } else {
        key
    }
}

/// Whether two paths denote the same file after normalization.
pub fn same_path(a: impl AsRef<Path>, b: impl AsRef<Path>) -> bool {
    normalize_path(a) == normalize_path(b)
}

/// Join `path` onto `base` unless it is already absolute, then clean it.
pub(crate) fn absolutize(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf().clean()
    } else {
        base.join(path).clean()
    }
}
