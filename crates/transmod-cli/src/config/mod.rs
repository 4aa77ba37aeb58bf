//! CLI configuration with multi-source loading.
//!
//! Priority: CLI flags > `TRANSMOD_*` environment > `transmod.config.json` > defaults

mod conversions;
mod defaults;
mod loading;
mod validation;

use serde::{Deserialize, Serialize};
use transmod::{FormatSpec, MinifyLevel};

use crate::cli::Platform;

pub use defaults::*;
pub use loading::{CONFIG_FILE_NAME, CliOverrides};

/// Batch settings, loaded from `transmod.config.json` and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransmodConfig {
    /// Input root, relative to the working directory
    #[serde(default = "default_root")]
    pub root: String,

    /// Output formats; bare tags or `{ "format", "outDir" }` targets
    #[serde(default = "default_formats")]
    pub formats: Vec<FormatSpec>,

    /// Extensions to include, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Globs to exclude, relative to the working directory
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Packages kept external
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,

    /// Regular expression of imports kept external
    #[serde(default, alias = "external_pattern", skip_serializing_if = "Option::is_none")]
    pub external_pattern: Option<String>,

    /// `true`/`false` or a level name
    #[serde(default)]
    pub minify: MinifySetting,

    /// Emit `.map` files
    #[serde(default)]
    pub sourcemap: bool,

    /// Target platform
    #[serde(default)]
    pub platform: Platform,

    /// Per-file timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Rebuild on change
    #[serde(default)]
    pub watch: bool,
}

/// Minification as written in config: a switch or a named level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinifySetting {
    Enabled(bool),
    Level(MinifyLevel),
}

impl MinifySetting {
    pub fn level(self) -> MinifyLevel {
        match self {
            MinifySetting::Enabled(enabled) => MinifyLevel::from(enabled),
            MinifySetting::Level(level) => level,
        }
    }
}

impl Default for MinifySetting {
    fn default() -> Self {
        MinifySetting::Enabled(false)
    }
}

impl Default for TransmodConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            formats: default_formats(),
            extensions: default_extensions(),
            ignore: default_ignore(),
            external: Vec::new(),
            external_pattern: None,
            minify: MinifySetting::default(),
            sourcemap: false,
            platform: Platform::default(),
            timeout: None,
            watch: false,
        }
    }
}
