//! Shared fixtures and mock bundlers for transmod integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use transmod::{BuildConfiguration, Bundler, EmittedFile, Error, Result};

/// Temp project with the given files (contents are a trivial module).
pub fn project(files: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for rel in files {
        write_file(dir.path(), rel, "export const value = 1;\n");
    }
    dir
}

pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, contents).expect("write file");
}

/// Echoes each unit's input path as its entry chunk.
#[derive(Default)]
pub struct EchoBundler {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl Bundler for EchoBundler {
    async fn bundle(&self, config: &BuildConfiguration) -> Result<Vec<EmittedFile>> {
        self.calls.lock().push(config.unit_name());
        Ok(vec![EmittedFile::entry(
            "entry.js",
            format!("// {}\n", config.file),
        )])
    }
}

/// Records how many units are in flight at once.
#[derive(Default)]
pub struct CountingBundler {
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub total: AtomicUsize,
}

#[async_trait]
impl Bundler for CountingBundler {
    async fn bundle(&self, _config: &BuildConfiguration) -> Result<Vec<EmittedFile>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        Ok(vec![EmittedFile::entry("entry.js", "1;")])
    }
}

/// Fails every unit whose input path contains the needle.
pub struct FailingBundler {
    pub needle: &'static str,
}

#[async_trait]
impl Bundler for FailingBundler {
    async fn bundle(&self, config: &BuildConfiguration) -> Result<Vec<EmittedFile>> {
        if config.file.contains(self.needle) {
            Err(Error::bundler_message(format!("cannot compile {}", config.file)))
        } else {
            Ok(vec![EmittedFile::entry("entry.js", "1;")])
        }
    }
}

/// Never finishes units whose input path contains the needle.
pub struct HangingBundler {
    pub needle: &'static str,
}

#[async_trait]
impl Bundler for HangingBundler {
    async fn bundle(&self, config: &BuildConfiguration) -> Result<Vec<EmittedFile>> {
        if config.file.contains(self.needle) {
            std::future::pending::<()>().await;
        }
        Ok(vec![EmittedFile::entry("entry.js", "1;")])
    }
}

pub fn shared<B: Bundler + 'static>(bundler: B) -> Arc<B> {
    Arc::new(bundler)
}
