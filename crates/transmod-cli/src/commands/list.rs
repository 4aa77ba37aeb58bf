//! `transmod list`: discovery without building.

use serde::Serialize;
use std::path::Path;
use transmod::{FormatSpec, ModuleFormat, discover, resolve_output_path};

use crate::cli::ListArgs;
use crate::commands::utils;
use crate::config::{CliOverrides, TransmodConfig};
use crate::error::Result;
use crate::ui;

/// One discovered input and where each format would write it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    /// cwd-relative input path
    pub file: String,
    pub outputs: Vec<ListOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOutput {
    pub format: ModuleFormat,
    /// cwd-relative output path
    pub path: String,
}

impl ListEntry {
    pub fn new(file: &str, formats: &[FormatSpec]) -> Self {
        let relative = resolve_output_path(file);
        let outputs = formats
            .iter()
            .map(|spec| {
                let resolved = spec.normalize();
                ListOutput {
                    format: resolved.format,
                    path: output_path(&resolved.out_dir, &relative),
                }
            })
            .collect();

        Self {
            file: file.to_string(),
            outputs,
        }
    }
}

fn output_path(out_dir: &Path, relative: &str) -> String {
    out_dir
        .join(relative)
        .to_string_lossy()
        .replace('\\', "/")
        .trim_start_matches("./")
        .to_string()
}

/// Execute the list command.
pub async fn execute(args: ListArgs) -> Result<()> {
    let cwd = utils::resolve_cwd(args.discovery.cwd.as_deref())?;
    let config = TransmodConfig::load(
        &CliOverrides::from_discovery_args(&args.discovery),
        &cwd,
        args.discovery.config.as_deref(),
    )?;

    let entries = collect(&config, &cwd)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.file);
        for output in &entry.outputs {
            println!("  {:<3} → {}", output.format.to_string(), output.path);
        }
    }
    ui::info(&format!(
        "{} file(s) under '{}'",
        entries.len(),
        config.input_root()
    ));
    Ok(())
}

pub(crate) fn collect(config: &TransmodConfig, cwd: &Path) -> Result<Vec<ListEntry>> {
    let files = discover(
        cwd,
        config.input_root(),
        &config.normalized_extensions(),
        &config.ignore,
    )?;

    Ok(files
        .iter()
        .map(|file| ListEntry::new(file, &config.formats))
        .collect())
}
