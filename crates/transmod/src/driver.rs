//! Single-file build driver.
//!
//! Runs the bundler once per (file, format) unit, decides where each
//! emitted file goes, and writes the results with temp-file-and-rename so a
//! reader never sees a half-written output.

use std::fs;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use path_clean::PathClean;
use tracing::{debug, warn};

use crate::bundler::{Bundler, EmittedFile, EmittedKind};
use crate::config::{BuildConfiguration, BuildJob, synthesize};
use crate::options::BatchOptions;
use crate::{Error, Result};

/// One file written by a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    /// Name the bundler emitted.
    pub file_name: String,
    pub kind: EmittedKind,
    /// Absolute path the file was written to.
    pub destination: PathBuf,
    /// Bytes written.
    pub size: usize,
}

/// Build and write one unit.
pub async fn drive_one(
    bundler: &dyn Bundler,
    config: &BuildConfiguration,
) -> Result<Vec<OutputRecord>> {
    let emitted = bundler.bundle(config).await?;

    let mut operations = Vec::with_capacity(emitted.len());
    let mut records = Vec::with_capacity(emitted.len());
    for file in emitted {
        let destination = destination_for(config, &file)?;
        let contents = match file.kind {
            EmittedKind::Entry => wrap_entry(config, file.contents),
            _ => file.contents,
        };
        records.push(OutputRecord {
            file_name: file.file_name,
            kind: file.kind,
            destination: destination.clone(),
            size: contents.len(),
        });
        operations.push((destination, contents));
    }

    tokio::task::spawn_blocking(move || write_files_atomic(&operations))
        .await
        .map_err(|e| Error::WriteFailure(format!("write task failed: {}", e)))??;

    debug!(
        "[transmod] wrote {} file(s) for {}",
        records.len(),
        config.unit_name()
    );
    Ok(records)
}

/// Synthesize and build every requested format of one file.
///
/// All formats run concurrently; the job fails if any format failed, after
/// all of them have finished.
pub async fn drive_job(
    bundler: &dyn Bundler,
    job: &BuildJob,
    options: &BatchOptions,
) -> Result<Vec<OutputRecord>> {
    let units = job.formats.iter().map(|spec| async move {
        let config = synthesize(job, spec, options)?;
        drive_one(bundler, &config).await
    });

    let mut records = Vec::new();
    let mut first_error = None;
    for result in join_all(units).await {
        match result {
            Ok(mut written) => records.append(&mut written),
            Err(e) => {
                if first_error.is_some() {
                    warn!("[transmod] {}: {}", job.path, e);
                } else {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(records),
    }
}

fn destination_for(config: &BuildConfiguration, file: &EmittedFile) -> Result<PathBuf> {
    let entry_dir = config.output_file.parent().unwrap_or(&config.output.dir);
    match file.kind {
        EmittedKind::Entry => Ok(config.output_file.clone()),
        EmittedKind::Chunk | EmittedKind::SourceMap => {
            let path = validate_output_path(entry_dir, &file.file_name)?;
            ensure_inside(&config.output.dir, path, &file.file_name)
        }
        EmittedKind::Asset => {
            let assets_dir = config.output.dir.join(&config.assets_dir).clean();
            let name = match &config.output.asset_file_names {
                Some(template) => apply_asset_template(template, &file.file_name),
                None => file.file_name.clone(),
            };
            let path = validate_output_path(&assets_dir, &name)?;
            ensure_inside(&config.output.dir, path, &name)
        }
    }
}

fn ensure_inside(dir: &Path, path: PathBuf, file_name: &str) -> Result<PathBuf> {
    if path.starts_with(dir) {
        Ok(path)
    } else {
        Err(Error::InvalidOutputPath(format!(
            "'{}' escapes output directory '{}'",
            file_name,
            dir.display()
        )))
    }
}

/// `[name]` and `[ext]` of the emitted file name substituted into the
/// template. Directory parts of the emitted name are dropped.
fn apply_asset_template(template: &str, file_name: &str) -> String {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    let (name, ext) = match base.rsplit_once('.') {
        Some((name, ext)) if !name.is_empty() => (name, ext),
        _ => (base, ""),
    };
    template.replace("[name]", name).replace("[ext]", ext)
}

fn wrap_entry(config: &BuildConfiguration, code: Vec<u8>) -> Vec<u8> {
    let banner = config.output.banner.as_deref();
    let footer = config.output.footer.as_deref();
    if banner.is_none() && footer.is_none() {
        return code;
    }

    let mut out = Vec::with_capacity(code.len());
    if let Some(banner) = banner {
        out.extend_from_slice(banner.as_bytes());
        out.push(b'\n');
    }
    out.extend_from_slice(&code);
    if let Some(footer) = footer {
        if !out.ends_with(b"\n") {
            out.push(b'\n');
        }
        out.extend_from_slice(footer.as_bytes());
        out.push(b'\n');
    }
    out
}

/// Join `filename` onto `base_dir`, rejecting anything that resolves
/// outside it.
fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();
    if !full_path.starts_with(base_dir) {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

/// Write everything to temp files first, then rename into place. Temp
/// files left by a failure are removed.
fn write_files_atomic(operations: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    let mut temp_files = Vec::with_capacity(operations.len());

    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&temp_files);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = temp_path_for(target_path);
        fs::write(&temp_path, content).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp_path.display(),
                e
            ))
        })?;

        temp_files.push((temp_path, target_path.clone()));
    }

    for (temp_path, target_path) in &temp_files {
        fs::rename(temp_path, target_path).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp_path.display(),
                target_path.display(),
                e
            ))
        })?;
    }

    Ok(())
}

/// `math.js` → `math.js.tmp`, so `math.js` and `math.js.map` never share
/// a temp file.
fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in temp_files {
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(temp_path) {
                warn!(
                    "Failed to clean up temporary file '{}': {}",
                    temp_path.display(),
                    e
                );
            }
        }
    }
}
