//! Bounded fan-out over independent units of work.
//!
//! Units run in fixed-size batches: every unit of a batch is polled
//! concurrently and the next batch starts only once the whole batch has
//! joined. A unit reports its own outcome, so one failing unit never cancels
//! its siblings.

use crate::lemlist::UpstreamError;
use futures_util::future::join_all;
use std::future::Future;

/// Result of one unit of work.
#[derive(Debug)]
pub enum UnitOutcome<T> {
    Success(T),
    /// The unit is dropped from the output; the run continues.
    Skip(String),
    /// The run cannot produce meaningful output; no further batches start.
    Fatal(UpstreamError),
}

/// Everything a batched run produced, in input order.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub results: Vec<T>,
    pub skipped: Vec<String>,
    pub fatal: Option<UpstreamError>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            skipped: Vec::new(),
            fatal: None,
        }
    }
}

/// Run `task` over `items`, `batch_size` at a time.
///
/// `task` receives the item plus its 1-based position and the total count
/// for progress reporting.
pub async fn run_in_batches<'a, I, T, F, Fut>(
    items: &'a [I],
    batch_size: usize,
    mut task: F,
) -> BatchReport<T>
where
    F: FnMut(&'a I, usize, usize) -> Fut,
    Fut: Future<Output = UnitOutcome<T>>,
{
    let total = items.len();
    let mut report = BatchReport::default();

    for (batch_index, batch) in items.chunks(batch_size.max(1)).enumerate() {
        let offset = batch_index * batch_size.max(1);
        let units = batch
            .iter()
            .enumerate()
            .map(|(i, item)| task(item, offset + i + 1, total));

        for outcome in join_all(units).await {
            match outcome {
                UnitOutcome::Success(value) => report.results.push(value),
                UnitOutcome::Skip(reason) => report.skipped.push(reason),
                UnitOutcome::Fatal(err) => {
                    if report.fatal.is_none() {
                        report.fatal = Some(err);
                    }
                }
            }
        }

        if report.fatal.is_some() {
            log::error!(
                "aborting after batch {}: {} of {total} units not started",
                batch_index + 1,
                total.saturating_sub(offset + batch.len())
            );
            break;
        }
    }

    report
}
