//! Batch orchestration.
//!
//! One [`run_batch`] call discovers its inputs, then dispatches one unit of
//! work per file through the bounded pool. Each unit builds every requested
//! format of its file. A failing unit never stops the batch: it is recorded
//! in the result and reported once on stderr.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use console::style;
use tracing::{debug, error};

use crate::bundler::Bundler;
use crate::config::BuildJob;
use crate::discovery::discover;
use crate::driver::drive_job;
use crate::format::FormatSpec;
use crate::options::BatchOptions;
use crate::pool::run_bounded;
use crate::{Error, Result};

/// Maximum number of files built at once.
pub const BATCH_CONCURRENCY: usize = 10;

/// Per-batch state. Created when a batch starts and dropped when it ends,
/// so concurrent or back-to-back batches never share a count.
#[derive(Debug, Default)]
struct BatchContext {
    succeeded: AtomicUsize,
    bytes_written: AtomicU64,
}

impl BatchContext {
    fn record_success(&self, bytes: u64) -> usize {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
        self.succeeded.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}

/// One failed file.
#[derive(Debug)]
pub struct UnitFailure {
    /// cwd-relative input path.
    pub file: String,
    pub error: Error,
}

/// Summary of a finished batch.
#[derive(Debug)]
pub struct BatchResult {
    /// Files discovered.
    pub total: usize,
    /// Files whose every format built.
    pub succeeded: usize,
    /// True when any file failed.
    pub failed: bool,
    pub failures: Vec<UnitFailure>,
    /// True when the batch's cancellation token fired.
    pub cancelled: bool,
    /// Bytes written by successful files, across all formats.
    pub bytes_written: u64,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        !self.failed
    }
}

/// Build every discovered file in every requested format.
///
/// Returns `Err` only when discovery fails; per-file failures are collected
/// in [`BatchResult::failures`].
pub async fn run_batch(bundler: Arc<dyn Bundler>, options: BatchOptions) -> Result<BatchResult> {
    let files = discover(
        &options.cwd,
        &options.input_root,
        &options.extensions,
        &options.ignore,
    )?;

    let total = files.len();
    let context = Arc::new(BatchContext::default());
    let formats: Arc<[FormatSpec]> = options.formats.clone().into();
    let options = Arc::new(options);

    debug!(
        "[transmod] batch start: {} file(s), {} format(s)",
        total,
        formats.len()
    );
    if let Some(on_start) = &options.callbacks.on_start {
        on_start(total);
    }

    let report = run_bounded(files, BATCH_CONCURRENCY, &options.cancel, |file| {
        let bundler = Arc::clone(&bundler);
        let options = Arc::clone(&options);
        let context = Arc::clone(&context);
        let job = BuildJob::new(file, Arc::clone(&formats));

        async move {
            let unit = drive_job(bundler.as_ref(), &job, &options);
            let records = match options.unit_timeout {
                Some(limit) => tokio::time::timeout(limit, unit)
                    .await
                    .map_err(|_| timeout_error(&job, limit))??,
                None => unit.await?,
            };

            let bytes = records.iter().map(|r| r.size as u64).sum();
            let count = context.record_success(bytes);
            debug!("[transmod] built {} ({}/{})", job.path, count, total);
            if let Some(on_success) = &options.callbacks.on_success {
                on_success(count, &job.path);
            }
            Ok::<(), Error>(())
        }
    })
    .await;

    if report.failed {
        let failed = report.outcomes.len() - report.succeeded();
        eprintln!(
            "{}",
            style(format!(
                "transmod: {} of {} file(s) failed to build",
                failed, total
            ))
            .red()
            .for_stderr()
        );
        for (file, err) in report.failures() {
            error!("[transmod] {}: {}", file, err);
        }
    }

    let succeeded = context.succeeded();
    if let Some(on_end) = &options.callbacks.on_end {
        on_end(succeeded);
    }

    let failures = report
        .outcomes
        .into_iter()
        .filter_map(|outcome| match outcome.result {
            Ok(()) => None,
            Err(error) => Some(UnitFailure {
                file: outcome.key,
                error,
            }),
        })
        .collect();

    Ok(BatchResult {
        total,
        succeeded,
        failed: report.failed,
        failures,
        cancelled: options.cancel.is_cancelled(),
        bytes_written: context.bytes_written(),
    })
}

fn timeout_error(job: &BuildJob, limit: Duration) -> Error {
    Error::Timeout {
        file: job.path.clone(),
        seconds: limit.as_secs_f64(),
    }
}
