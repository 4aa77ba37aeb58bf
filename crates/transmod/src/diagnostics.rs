//! Diagnostic extraction from Rolldown errors.
//!
//! Rolldown reports failures as batched diagnostics whose concrete types are
//! not part of its stable surface. We flatten them into [`ExtractedDiagnostic`]
//! values that are cloneable, serializable and safe to carry across the
//! per-unit failure list of a batch.

use serde::{Deserialize, Serialize};

/// Extracted diagnostic information from a failed build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDiagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub help: Option<String>,
}

impl ExtractedDiagnostic {
    /// A plain error diagnostic with no location information.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Other("BuildFailure".to_string()),
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            file: None,
            line: None,
            column: None,
            help: None,
        }
    }
}

/// Diagnostic kind (mirrors Rolldown's EventKind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingExport,
    ParseError,
    UnresolvedEntry,
    UnresolvedImport,
    InvalidOption,
    Plugin,
    Transform,
    Other(String),
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::MissingExport => write!(f, "MissingExport"),
            DiagnosticKind::ParseError => write!(f, "ParseError"),
            DiagnosticKind::UnresolvedEntry => write!(f, "UnresolvedEntry"),
            DiagnosticKind::UnresolvedImport => write!(f, "UnresolvedImport"),
            DiagnosticKind::InvalidOption => write!(f, "InvalidOption"),
            DiagnosticKind::Plugin => write!(f, "Plugin"),
            DiagnosticKind::Transform => write!(f, "Transform"),
            DiagnosticKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Extract diagnostics from Rolldown error types.
///
/// Rolldown's batched error only exposes `Debug`, so the formatted string is
/// split per diagnostic and each part is classified by keyword.
pub fn extract_from_rolldown_error(error: &dyn std::fmt::Debug) -> Vec<ExtractedDiagnostic> {
    let error_str = format!("{error:?}");

    let parts: Vec<&str> = error_str
        .split("BatchedBuildDiagnostic")
        .filter(|s| !s.trim().is_empty())
        .collect();

    if parts.len() > 1 {
        parts.iter().map(|part| extract_single(part)).collect()
    } else {
        vec![extract_single(&error_str)]
    }
}

fn extract_single(error_str: &str) -> ExtractedDiagnostic {
    let kind = if error_str.contains("MissingExport") {
        DiagnosticKind::MissingExport
    } else if error_str.contains("Parse error")
        || error_str.contains("Syntax")
        || error_str.contains("Expected")
    {
        DiagnosticKind::ParseError
    } else if error_str.contains("UnresolvedEntry") {
        DiagnosticKind::UnresolvedEntry
    } else if error_str.contains("UnresolvedImport") || error_str.contains("Cannot resolve") {
        DiagnosticKind::UnresolvedImport
    } else if error_str.contains("InvalidOption") {
        DiagnosticKind::InvalidOption
    } else if error_str.contains("Plugin") {
        DiagnosticKind::Plugin
    } else if error_str.contains("Transform") || error_str.contains("transform") {
        DiagnosticKind::Transform
    } else {
        DiagnosticKind::Other("BuildFailure".to_string())
    };

    let severity = if error_str.contains("Warning") || error_str.contains("warning") {
        DiagnosticSeverity::Warning
    } else {
        DiagnosticSeverity::Error
    };

    let (line, column) = extract_location(error_str);

    ExtractedDiagnostic {
        kind,
        severity,
        message: error_str.trim().to_string(),
        file: extract_file_path(error_str),
        line,
        column,
        help: extract_help_text(error_str),
    }
}

/// Find the first script-like path mentioned in the message.
fn extract_file_path(text: &str) -> Option<String> {
    const EXTENSIONS: &[&str] = &[
        ".tsx", ".ts", ".jsx", ".mjs", ".cjs", ".js", ".vue", ".svelte",
    ];

    text.split(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | ',' | '(' | ')'))
        .map(|token| token.trim_end_matches(|c: char| c == ':' || c.is_ascii_digit()))
        .find(|token| EXTENSIONS.iter().any(|ext| token.ends_with(ext)))
        .map(str::to_string)
}

/// Parse a `file:line:column` triple if present.
fn extract_location(text: &str) -> (Option<u32>, Option<u32>) {
    for token in text.split_whitespace() {
        let mut parts = token.rsplitn(3, ':');
        let column = parts
            .next()
            .and_then(|c| c.trim_end_matches(|ch: char| !ch.is_ascii_digit()).parse().ok());
        let line = parts.next().and_then(|l| l.parse().ok());
        if let (Some(line), Some(column)) = (line, column) {
            if parts.next().is_some() {
                return (Some(line), Some(column));
            }
        }
    }
    (None, None)
}

fn extract_help_text(text: &str) -> Option<String> {
    for indicator in &["help: ", "Help: ", "hint: ", "Hint: "] {
        if let Some(pos) = text.find(indicator) {
            let help = text[pos + indicator.len()..]
                .lines()
                .next()
                .unwrap_or("")
                .trim();
            if !help.is_empty() {
                return Some(help.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Raw(&'static str);

    impl std::fmt::Debug for Raw {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    #[test]
    fn test_parse_error_kind() {
        let diags = extract_from_rolldown_error(&Raw("Parse error: Expected `;` in src/a.ts:3:14"));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ParseError);
        assert_eq!(diags[0].file.as_deref(), Some("src/a.ts"));
        assert_eq!(diags[0].line, Some(3));
        assert_eq!(diags[0].column, Some(14));
    }

    #[test]
    fn test_unresolved_import_kind() {
        let diags = extract_from_rolldown_error(&Raw("Cannot resolve './missing' from 'src/b.js'"));
        assert_eq!(diags[0].kind, DiagnosticKind::UnresolvedImport);
        assert_eq!(diags[0].file.as_deref(), Some("src/b.js"));
    }

    #[test]
    fn test_batched_diagnostics_split() {
        let raw = "BatchedBuildDiagnostic { MissingExport foo } BatchedBuildDiagnostic { Plugin bar }";
        let diags = extract_from_rolldown_error(&Raw(raw));
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].kind, DiagnosticKind::MissingExport);
        assert_eq!(diags[1].kind, DiagnosticKind::Plugin);
    }

    #[test]
    fn test_help_extraction() {
        let diags = extract_from_rolldown_error(&Raw("UnresolvedImport\nhelp: install the package"));
        assert_eq!(diags[0].help.as_deref(), Some("install the package"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(DiagnosticKind::ParseError.to_string(), "ParseError");
        assert_eq!(DiagnosticKind::Other("X".into()).to_string(), "X");
    }
}
