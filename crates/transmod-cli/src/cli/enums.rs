use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Target platform environment
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Browser environment
    ///
    /// Node.js built-ins are not available.
    #[value(name = "browser")]
    Browser,

    /// Node.js environment
    ///
    /// Node.js built-in modules resolve as externals.
    #[value(name = "node")]
    Node,

    /// No platform assumptions
    ///
    /// Suits libraries consumed by both browsers and Node.js.
    #[default]
    #[value(name = "neutral")]
    Neutral,
}

impl From<Platform> for transmod::Platform {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Browser => transmod::Platform::Browser,
            Platform::Node => transmod::Platform::Node,
            Platform::Neutral => transmod::Platform::Neutral,
        }
    }
}
