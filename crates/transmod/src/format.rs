//! Output format specifications.
//!
//! A batch requests one or more formats. Each entry is either a bare tag
//! (`"cjs"`, `"es"`) or a `{ "format": .., "outDir": .. }` target. Before
//! dispatch every entry is normalized to a [`ResolvedFormat`] that always
//! carries an explicit output directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{Error, Result};

/// Module output convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    /// CommonJS (`require` / `module.exports`).
    Cjs,
    /// ECMAScript modules (`import` / `export`).
    #[serde(alias = "esm")]
    Es,
}

impl ModuleFormat {
    /// Directory used when a bare tag carries no `outDir`.
    ///
    /// CommonJS output conventionally lives in `lib/`, ES output in `es/`.
    pub fn default_out_dir(self) -> &'static str {
        match self {
            ModuleFormat::Cjs => "lib",
            ModuleFormat::Es => "es",
        }
    }

    pub(crate) fn to_rolldown(self) -> rolldown::OutputFormat {
        match self {
            ModuleFormat::Cjs => rolldown::OutputFormat::Cjs,
            ModuleFormat::Es => rolldown::OutputFormat::Esm,
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleFormat::Cjs => write!(f, "cjs"),
            ModuleFormat::Es => write!(f, "es"),
        }
    }
}

impl FromStr for ModuleFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cjs" | "commonjs" => Ok(ModuleFormat::Cjs),
            "es" | "esm" => Ok(ModuleFormat::Es),
            other => Err(Error::InvalidConfig(format!(
                "Unknown module format '{}'. Expected: cjs, es",
                other
            ))),
        }
    }
}

/// A requested output format, as written by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatSpec {
    /// Bare tag; the output directory falls back to the format default.
    Tag(ModuleFormat),
    /// Explicit target.
    Target {
        format: ModuleFormat,
        #[serde(rename = "outDir", default, skip_serializing_if = "Option::is_none")]
        out_dir: Option<PathBuf>,
    },
}

impl FormatSpec {
    /// Format with an explicit output directory.
    pub fn target(format: ModuleFormat, out_dir: impl Into<PathBuf>) -> Self {
        FormatSpec::Target {
            format,
            out_dir: Some(out_dir.into()),
        }
    }

    pub fn format(&self) -> ModuleFormat {
        match self {
            FormatSpec::Tag(format) | FormatSpec::Target { format, .. } => *format,
        }
    }

    /// Resolve to a format with a concrete (still cwd-relative) directory.
    pub fn normalize(&self) -> ResolvedFormat {
        let format = self.format();
        let out_dir = match self {
            FormatSpec::Target {
                out_dir: Some(dir), ..
            } => dir.clone(),
            _ => PathBuf::from(format.default_out_dir()),
        };
        ResolvedFormat { format, out_dir }
    }
}

impl From<ModuleFormat> for FormatSpec {
    fn from(format: ModuleFormat) -> Self {
        FormatSpec::Tag(format)
    }
}

/// Parses `es`, `cjs` or `format:outDir`.
impl FromStr for FormatSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((format, dir)) if !dir.trim().is_empty() => {
                Ok(FormatSpec::target(format.trim().parse()?, dir.trim()))
            }
            Some((_, _)) => Err(Error::InvalidConfig(format!(
                "Format '{}' has an empty output directory",
                s
            ))),
            None => Ok(FormatSpec::Tag(s.trim().parse()?)),
        }
    }
}

/// A format paired with its output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFormat {
    pub format: ModuleFormat,
    pub out_dir: PathBuf,
}

/// Both supported formats in their conventional directories.
pub fn default_formats() -> Vec<FormatSpec> {
    vec![
        FormatSpec::target(ModuleFormat::Es, ModuleFormat::Es.default_out_dir()),
        FormatSpec::target(ModuleFormat::Cjs, ModuleFormat::Cjs.default_out_dir()),
    ]
}
