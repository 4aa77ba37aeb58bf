//! External module classification.
//!
//! Every import seen while building one file is classified as either
//! bundled into that file's output or left as an external reference.
//! Each source file compiles to its own output file, so imports stay
//! external unless a caller explicitly asks for one to be bundled: sibling
//! modules keep their own output, stylesheets and JSON stay on disk,
//! compiler intermediates of single-file components are never inlined, and
//! a file never bundles itself.

use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use crate::paths::{absolutize, normalize_path};

/// Non-JS asset suffixes that are always left external.
pub const ASSET_SUFFIXES: &[&str] = &[
    ".css", ".scss", ".sass", ".less", ".styl", ".stylus", ".pcss", ".postcss", ".svg", ".json",
];

/// Query markers of a single-file-component sub-language pass,
/// e.g. `Comp.vue?vue&type=style&index=0&lang.css`.
static SFC_INTERMEDIATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\?(?:vue|svelte|astro)&type=").expect("static regex is valid")
});

/// What to do with one imported module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Inline into the output. Only ever chosen by a caller override.
    Bundle,
    /// Leave as an import of the original specifier.
    External,
}

/// Everything a classifier gets to see about one import.
#[derive(Debug, Clone, Copy)]
pub struct ExternalQuery<'a> {
    /// Specifier or resolved id, as the bundler presents it.
    pub module_id: &'a str,
    /// Absolute id of the importing module, if any.
    pub importer: Option<&'a str>,
    /// Whether `module_id` has already been resolved to a path.
    pub is_resolved: bool,
    /// Absolute path of the file this build unit compiles.
    pub owner_file: &'a Path,
    /// Working directory of the batch.
    pub cwd: &'a Path,
}

impl ExternalQuery<'_> {
    /// Absolute form of `module_id`, resolving `./` and `../` against the
    /// importer's directory and anything else against `cwd`.
    pub fn absolute_id(&self) -> PathBuf {
        let id = Path::new(self.module_id);
        let is_relative = self.module_id.starts_with("./") || self.module_id.starts_with("../");
        match self.importer {
            Some(importer) if is_relative && !self.is_resolved => {
                let base = Path::new(importer).parent().unwrap_or(self.cwd);
                absolutize(base, id)
            }
            _ => absolutize(self.cwd, id),
        }
    }

    /// True when this import points back at the file being built.
    pub fn is_self_reference(&self) -> bool {
        normalize_path(self.absolute_id()) == normalize_path(self.owner_file)
    }
}

/// Built-in classification.
///
/// Returns `Some(External)` for asset suffixes, SFC intermediates and
/// self-references, and `None` (no opinion, which is also external) for
/// everything else.
pub fn default_policy(query: &ExternalQuery<'_>) -> Option<Disposition> {
    let without_query = query
        .module_id
        .split_once('?')
        .map_or(query.module_id, |(path, _)| path);

    if ASSET_SUFFIXES
        .iter()
        .any(|suffix| without_query.ends_with(suffix))
    {
        return Some(Disposition::External);
    }

    if SFC_INTERMEDIATE.is_match(query.module_id) {
        return Some(Disposition::External);
    }

    if query.is_self_reference() {
        return Some(Disposition::External);
    }

    None
}

pub type ExternalFn = dyn Fn(&ExternalQuery<'_>) -> Option<Disposition> + Send + Sync;

/// Caller override for classification.
#[derive(Clone)]
pub enum ExternalOption {
    /// Package names (and their subpaths) that are external. Anything else
    /// falls through to [`default_policy`].
    List(Vec<String>),
    /// Ids matching the pattern are external. Anything else falls through
    /// to [`default_policy`].
    Pattern(Regex),
    /// Full control. Call [`default_policy`] from inside to keep the
    /// built-in rules.
    Resolver(Arc<ExternalFn>),
}

impl ExternalOption {
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&ExternalQuery<'_>) -> Option<Disposition> + Send + Sync + 'static,
    {
        ExternalOption::Resolver(Arc::new(f))
    }

    fn classify(&self, query: &ExternalQuery<'_>) -> Option<Disposition> {
        match self {
            ExternalOption::List(names) => {
                let listed = names.iter().any(|name| {
                    query.module_id == name.as_str()
                        || query
                            .module_id
                            .strip_prefix(name.as_str())
                            .is_some_and(|rest| rest.starts_with('/'))
                });
                if listed {
                    Some(Disposition::External)
                } else {
                    default_policy(query)
                }
            }
            ExternalOption::Pattern(pattern) => {
                if pattern.is_match(query.module_id) {
                    Some(Disposition::External)
                } else {
                    default_policy(query)
                }
            }
            ExternalOption::Resolver(resolve) => resolve(query),
        }
    }
}

impl fmt::Debug for ExternalOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalOption::List(names) => f.debug_tuple("List").field(names).finish(),
            ExternalOption::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            ExternalOption::Resolver(_) => f.write_str("Resolver(<fn>)"),
        }
    }
}

impl From<Vec<String>> for ExternalOption {
    fn from(names: Vec<String>) -> Self {
        ExternalOption::List(names)
    }
}

impl From<Regex> for ExternalOption {
    fn from(pattern: Regex) -> Self {
        ExternalOption::Pattern(pattern)
    }
}

/// Classifier bound to one build unit's owner file.
#[derive(Debug, Clone)]
pub struct ExternalClassifier {
    cwd: PathBuf,
    owner_file: PathBuf,
    option: Option<ExternalOption>,
}

impl ExternalClassifier {
    pub fn new(cwd: impl Into<PathBuf>, owner_file: impl AsRef<Path>) -> Self {
        let cwd = cwd.into();
        let owner_file = absolutize(&cwd, owner_file);
        Self {
            cwd,
            owner_file,
            option: None,
        }
    }

    pub fn with_option(mut self, option: Option<ExternalOption>) -> Self {
        self.option = option;
        self
    }

    pub fn owner_file(&self) -> &Path {
        &self.owner_file
    }

    /// Classify one import. `None` means no rule had an opinion.
    pub fn classify(
        &self,
        module_id: &str,
        importer: Option<&str>,
        is_resolved: bool,
    ) -> Option<Disposition> {
        let query = ExternalQuery {
            module_id,
            importer,
            is_resolved,
            owner_file: &self.owner_file,
            cwd: &self.cwd,
        };

        match &self.option {
            Some(option) => option.classify(&query),
            None => default_policy(&query),
        }
    }

    /// Everything except an explicit [`Disposition::Bundle`] is external.
    pub fn is_external(&self, module_id: &str, importer: Option<&str>, is_resolved: bool) -> bool {
        self.classify(module_id, importer, is_resolved) != Some(Disposition::Bundle)
    }
}
