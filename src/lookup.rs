//! Bounded-concurrency per-dependency lookups
//!
//! Each package name is an independent unit of work. Lookups run on a
//! `JoinSet` behind a semaphore; a failure only drops that name and is
//! reported as a warning.

use crate::error::ServiceError;
use crate::progress::Progress;
use crate::service::validate_package_name;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default number of lookups in flight
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Results of a batch of lookups
#[derive(Debug)]
pub struct LookupOutcome<T> {
    /// Successful lookups keyed by name
    pub results: BTreeMap<String, T>,
    /// One message per failed or skipped name, sorted
    pub warnings: Vec<String>,
}

impl<T> Default for LookupOutcome<T> {
    fn default() -> Self {
        Self {
            results: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }
}

/// Runs `lookup` for every name with at most `concurrency` calls in flight.
///
/// Names that fail validation are never passed to `lookup`.
pub async fn lookup_all<T, F, Fut>(
    names: &[String],
    concurrency: usize,
    progress: &Progress,
    lookup: F,
) -> LookupOutcome<T>
where
    T: Send + 'static,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
{
    let mut outcome = LookupOutcome::default();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for name in names {
        if let Err(e) = validate_package_name(name) {
            outcome.warnings.push(format!("skipping {}", e));
            progress.inc();
            continue;
        }

        let semaphore = Arc::clone(&semaphore);
        let future = lookup(name.clone());
        let name = name.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (name, future.await)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        progress.inc();
        match joined {
            Ok((name, Ok(value))) => {
                outcome.results.insert(name, value);
            }
            Ok((name, Err(e))) => outcome.warnings.push(format!("skipping {}: {}", name, e)),
            Err(e) => outcome.warnings.push(format!("lookup task failed: {}", e)),
        }
    }

    outcome.warnings.sort();
    outcome
}
