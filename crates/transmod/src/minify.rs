//! Minification level for per-file output.
//!
//! Synthesized configurations start at [`MinifyLevel::None`]; a build
//! override may raise it for some or all files.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifyLevel {
    /// Readable output.
    #[default]
    None,
    /// Whitespace and comments only.
    Whitespace,
    /// Syntax-level rewrites, identifiers kept.
    Syntax,
    /// Everything, including identifier mangling.
    Identifiers,
}

impl MinifyLevel {
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Rolldown only exposes an on/off switch, so every enabled level maps
    /// to full minification.
    pub(crate) fn to_rolldown_options(self) -> Option<rolldown::RawMinifyOptions> {
        self.is_enabled()
            .then(|| rolldown::RawMinifyOptions::from(true))
    }
}

impl From<bool> for MinifyLevel {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Identifiers } else { Self::None }
    }
}

impl FromStr for MinifyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" | "false" => Ok(Self::None),
            "whitespace" => Ok(Self::Whitespace),
            "syntax" => Ok(Self::Syntax),
            "identifiers" | "true" => Ok(Self::Identifiers),
            _ => Err(Error::InvalidConfig(format!(
                "Invalid minify level: '{}'. Expected: none, whitespace, syntax, identifiers",
                s
            ))),
        }
    }
}

impl std::fmt::Display for MinifyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Whitespace => "whitespace",
            Self::Syntax => "syntax",
            Self::Identifiers => "identifiers",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("none".parse::<MinifyLevel>().unwrap(), MinifyLevel::None);
        assert_eq!("SYNTAX".parse::<MinifyLevel>().unwrap(), MinifyLevel::Syntax);
        assert_eq!("true".parse::<MinifyLevel>().unwrap(), MinifyLevel::Identifiers);
        assert!("min".parse::<MinifyLevel>().is_err());
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(MinifyLevel::from(false), MinifyLevel::None);
        assert!(MinifyLevel::from(true).is_enabled());
    }

    #[test]
    fn test_rolldown_mapping() {
        assert!(MinifyLevel::None.to_rolldown_options().is_none());
        assert!(MinifyLevel::Whitespace.to_rolldown_options().is_some());
    }
}
