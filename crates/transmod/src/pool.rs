//! Bounded concurrency pool.
//!
//! Units are dispatched in order, each only after a permit is free, so at
//! most `limit` run at once. A failing, panicking or cancelled unit is
//! recorded and the rest carry on.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Result of one unit.
#[derive(Debug)]
pub struct UnitOutcome<T> {
    pub key: String,
    pub result: Result<T>,
}

impl<T> UnitOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything the pool observed, in dispatch order.
#[derive(Debug)]
pub struct PoolReport<T> {
    pub outcomes: Vec<UnitOutcome<T>>,
    /// True when any unit failed.
    pub failed: bool,
}

impl<T> PoolReport<T> {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(_) => None,
            Err(e) => Some((o.key.as_str(), e)),
        })
    }
}

/// Run `worker` for every key with at most `limit` units in flight.
///
/// Keys not yet dispatched when `cancel` fires are reported as
/// [`Error::Cancelled`] without running; units in flight are dropped at
/// their next await point.
pub async fn run_bounded<K, T, F, Fut>(
    keys: K,
    limit: usize,
    cancel: &CancellationToken,
    worker: F,
) -> PoolReport<T>
where
    K: IntoIterator<Item = String>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut join_set = JoinSet::new();
    let mut outcomes: Vec<(usize, UnitOutcome<T>)> = Vec::new();

    for (index, key) in keys.into_iter().enumerate() {
        if cancel.is_cancelled() {
            outcomes.push((index, cancelled(key)));
            continue;
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
        };
        let Some(permit) = permit else {
            outcomes.push((index, cancelled(key)));
            continue;
        };

        let unit = worker(key.clone());
        let token = cancel.clone();
        join_set.spawn(async move {
            let _permit = permit;
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => Err(Error::Cancelled(key.clone())),
                caught = AssertUnwindSafe(unit).catch_unwind() => {
                    caught.unwrap_or_else(|panic| Err(Error::Panicked(panic_message(panic.as_ref()))))
                }
            };
            (index, UnitOutcome { key, result })
        });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(join_err) => outcomes.push((
                usize::MAX,
                UnitOutcome {
                    key: "unknown".to_string(),
                    result: Err(Error::Panicked(join_err.to_string())),
                },
            )),
        }
    }

    outcomes.sort_by_key(|(index, _)| *index);
    let outcomes: Vec<_> = outcomes.into_iter().map(|(_, o)| o).collect();
    let failed = outcomes.iter().any(|o| !o.is_ok());

    PoolReport { outcomes, failed }
}

fn cancelled<T>(key: String) -> UnitOutcome<T> {
    UnitOutcome {
        result: Err(Error::Cancelled(key.clone())),
        key,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
