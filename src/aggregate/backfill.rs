//! Re-run the hourly aggregation over a span of hour keys.

use rayon::prelude::*;
use tracing::info;

use crate::aggregate::{aggregate_hour, HourOutcome};
use crate::domain::HourKey;
use crate::error::AggregateError;
use crate::store::StoreLayout;

/// Per-key results of a backfill, in key order.
#[derive(Debug, Default)]
pub struct BackfillReport {
    pub results: Vec<Result<HourOutcome, AggregateError>>,
}

impl BackfillReport {
    pub fn written(&self) -> usize {
        self.count(|r| matches!(r, Ok(HourOutcome::Written { .. })))
    }

    pub fn no_data(&self) -> usize {
        self.count(|r| matches!(r, Ok(HourOutcome::NoData { .. })))
    }

    pub fn missing(&self) -> usize {
        self.count(|r| matches!(r, Err(AggregateError::PartitionNotFound { .. })))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, Err(AggregateError::Processing { .. })))
    }

    fn count(&self, pred: impl Fn(&Result<HourOutcome, AggregateError>) -> bool) -> usize {
        self.results.iter().filter(|r| pred(r)).count()
    }
}

/// Every hour key from `from` through `to`, inclusive. Empty if `from > to`.
pub fn hour_span(from: HourKey, to: HourKey) -> Vec<HourKey> {
    let mut keys = Vec::new();
    let mut cur = from;
    while cur <= to {
        keys.push(cur);
        cur = cur.next();
    }
    keys
}

/// Aggregate every hour in `[from, to]`.
///
/// Distinct keys write distinct files, so hours are processed in parallel.
pub fn backfill(layout: &StoreLayout, from: HourKey, to: HourKey) -> BackfillReport {
    let keys = hour_span(from, to);
    info!(%from, %to, hours = keys.len(), "starting backfill");

    let results: Vec<_> = keys.par_iter().map(|key| aggregate_hour(layout, key)).collect();

    let report = BackfillReport { results };
    info!(
        written = report.written(),
        no_data = report.no_data(),
        missing = report.missing(),
        failed = report.failed(),
        "backfill finished"
    );
    report
}
