use regex::Regex;
use transmod::normalize_path;

use crate::config::TransmodConfig;
use crate::error::{ConfigError, Result};

impl TransmodConfig {
    /// Validate the merged configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        let root = self.root.trim_matches('/');
        if root.is_empty()
            || root.contains('/')
            || root.contains('\\')
            || root == "."
            || root == ".."
        {
            return Err(ConfigError::InvalidValue {
                field: "root".to_string(),
                value: self.root.clone(),
                hint: "Use a single directory name directly under the working directory, e.g. \"src\""
                    .to_string(),
            }
            .into());
        }

        if self.formats.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "formats".to_string(),
                value: "[]".to_string(),
                hint: "Request at least one of \"cjs\" or \"es\"".to_string(),
            }
            .into());
        }

        let mut seen: Vec<String> = Vec::with_capacity(self.formats.len());
        for spec in &self.formats {
            let dir = normalize_path(spec.normalize().out_dir);
            if seen.contains(&dir) {
                return Err(ConfigError::ConflictingOptions(format!(
                    "two formats write to the same directory '{}'",
                    dir
                ))
                .into());
            }
            seen.push(dir);
        }

        if self.extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "extensions".to_string(),
                value: format!("{:?}", self.extensions),
                hint: "List at least one extension, e.g. [\"ts\", \"tsx\"]".to_string(),
            }
            .into());
        }

        if let Some(pattern) = &self.external_pattern {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
                field: "externalPattern".to_string(),
                value: pattern.clone(),
                hint: e.to_string(),
            })?;
        }

        if self.timeout == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "timeout".to_string(),
                value: "0".to_string(),
                hint: "Use a positive number of seconds, or leave it unset".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
