use regex::Regex;
use std::path::Path;
use std::time::Duration;
use transmod::{BatchOptions, BuildOverride, ExternalOption, Resolver};

use crate::config::TransmodConfig;
use crate::error::{ConfigError, Result};

impl TransmodConfig {
    /// Library options for one batch rooted at `cwd`.
    ///
    /// Lifecycle callbacks and the cancellation token are left to the caller.
    pub fn to_batch_options(&self, cwd: &Path) -> Result<BatchOptions> {
        let mut options = BatchOptions::new(cwd)
            .input_root(self.input_root())
            .formats(self.formats.iter().cloned())
            .extensions(self.normalized_extensions())
            .ignore(self.ignore.iter().cloned())
            .watch(self.watch)
            .build_override(Resolver::constant(BuildOverride {
                minify: Some(self.minify.level()),
                sourcemap: Some(self.sourcemap),
                platform: Some(self.platform.into()),
            }));

        if let Some(external) = self.external_option()? {
            options = options.external(external);
        }

        if let Some(secs) = self.timeout {
            options = options.unit_timeout(Duration::from_secs(secs));
        }

        Ok(options)
    }

    /// Input root without surrounding slashes.
    pub fn input_root(&self) -> &str {
        self.root.trim_matches('/')
    }

    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect()
    }

    /// Package list, pattern, or both folded into one pattern.
    pub(crate) fn external_option(&self) -> Result<Option<ExternalOption>> {
        let pattern = match (&self.external_pattern, self.external.is_empty()) {
            (None, true) => return Ok(None),
            (None, false) => return Ok(Some(ExternalOption::List(self.external.clone()))),
            (Some(pattern), true) => pattern.clone(),
            (Some(pattern), false) => {
                let names = self
                    .external
                    .iter()
                    .map(|name| regex::escape(name))
                    .collect::<Vec<_>>()
                    .join("|");
                format!("^(?:{})(?:/|$)|(?:{})", names, pattern)
            }
        };

        let regex = Regex::new(&pattern).map_err(|e| ConfigError::InvalidValue {
            field: "externalPattern".to_string(),
            value: pattern.clone(),
            hint: e.to_string(),
        })?;
        Ok(Some(ExternalOption::Pattern(regex)))
    }
}
