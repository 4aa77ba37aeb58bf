//! The seam between orchestration and the compiler.

use async_trait::async_trait;

use crate::Result;
use crate::config::BuildConfiguration;

/// What kind of file a bundler emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmittedKind {
    /// The chunk compiled from the unit's input. Exactly one per unit.
    Entry,
    /// Any other code chunk.
    Chunk,
    /// Source map of a code chunk, written next to it.
    SourceMap,
    /// A non-code file.
    Asset,
}

/// One file produced by a bundler, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// Name the bundler chose, relative to the output directory.
    pub file_name: String,
    pub contents: Vec<u8>,
    pub kind: EmittedKind,
}

impl EmittedFile {
    pub fn entry(file_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: code.into().into_bytes(),
            kind: EmittedKind::Entry,
        }
    }
}

/// Compiles one build unit.
///
/// Called exactly once per unit. Implementations return what they emitted
/// and leave writing to the driver.
#[async_trait]
pub trait Bundler: Send + Sync {
    async fn bundle(&self, config: &BuildConfiguration) -> Result<Vec<EmittedFile>>;
}
