use regex::Regex;
use transmod::FormatSpec;

/// Parse an output format: `es`, `cjs` or `format:outDir`.
///
/// `esm` and `commonjs` are accepted as aliases.
pub fn parse_format_spec(s: &str) -> Result<FormatSpec, String> {
    s.parse::<FormatSpec>().map_err(|e| match e {
        transmod::Error::InvalidConfig(msg) => msg,
        other => other.to_string(),
    })
}

/// Parse a file extension, dropping a leading dot.
///
/// Valid: `ts`, `.tsx`, `vue`
/// Invalid: `""`, `.`, `d/ts`
pub fn parse_extension(s: &str) -> Result<String, String> {
    let ext = s.trim().trim_start_matches('.');

    if ext.is_empty() {
        return Err("Extension cannot be empty".to_string());
    }

    if ext.contains(['/', '\\', '*']) {
        return Err(format!(
            "Extension must be a plain suffix like 'ts', got '{}'",
            s
        ));
    }

    Ok(ext.to_string())
}

/// Parse a per-file timeout in whole seconds; zero is rejected.
pub fn parse_timeout(s: &str) -> Result<u64, String> {
    let secs: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Timeout must be a whole number of seconds, got '{}'", s))?;

    if secs == 0 {
        return Err("Timeout must be at least 1 second".to_string());
    }

    Ok(secs)
}

/// Compile an `--external-pattern` regular expression.
pub fn parse_regex(s: &str) -> Result<Regex, String> {
    Regex::new(s).map_err(|e| format!("Invalid regular expression '{}': {}", s, e))
}
