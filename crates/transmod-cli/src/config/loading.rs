use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use transmod::FormatSpec;

use crate::cli::{BuildArgs, DiscoveryArgs, Platform};
use crate::config::TransmodConfig;
use crate::error::{ConfigError, Result};

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "transmod.config.json";

const ENV_PREFIX: &str = "TRANSMOD_";

/// The flags a user actually passed. Unset flags are skipped when
/// serialized, so they never shadow lower layers.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<FormatSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,
}

impl CliOverrides {
    pub fn from_discovery_args(args: &DiscoveryArgs) -> Self {
        Self {
            root: args.root.clone(),
            formats: args.formats.clone(),
            extensions: args.extensions.clone(),
            ignore: args.ignore.clone(),
            ..Self::default()
        }
    }

    pub fn from_build_args(args: &BuildArgs) -> Self {
        Self {
            external: args.external.clone(),
            external_pattern: args.external_pattern.as_ref().map(|re| re.as_str().to_string()),
            // Boolean flags can only switch things on.
            minify: args.minify.then_some(true),
            sourcemap: args.sourcemap.then_some(true),
            platform: args.platform,
            timeout: args.timeout,
            watch: args.watch.then_some(true),
            ..Self::from_discovery_args(&args.discovery)
        }
    }
}

impl TransmodConfig {
    /// Merge defaults, the config file, `TRANSMOD_*` variables and CLI
    /// flags, in increasing priority.
    ///
    /// An explicit `config_path` must exist; the default file is optional.
    pub fn load(overrides: &CliOverrides, cwd: &Path, config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = Self::config_file(cwd, config_path)? {
            tracing::debug!("[transmod] loading config from {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        figment = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides));

        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::Extract(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn config_file(cwd: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        match explicit {
            Some(path) => {
                let path = cwd.join(path);
                if path.is_file() {
                    Ok(Some(path))
                } else {
                    Err(ConfigError::NotFound(path).into())
                }
            }
            None => {
                let path = cwd.join(CONFIG_FILE_NAME);
                Ok(path.is_file().then_some(path))
            }
        }
    }
}
