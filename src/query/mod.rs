//! Range loading: gather every aggregate file whose hour falls in a window.
//!
//! The loader is read-only and tolerant. A file that cannot be parsed is logged and
//! left out, and the query carries on with the rest. "Nothing found" is a normal
//! result (`None`), not an error.

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{AggregateRecord, DateRange, HourKey};
use crate::io::read_aggregate_file;
use crate::store::StoreLayout;

/// A file that qualified for the window but could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Concatenated aggregate rows for one window.
///
/// Rows are kept exactly as stored: if two files share a `(formatted_date, article)`
/// pair, both rows are present and the consumer sums them.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeDataset {
    pub range: DateRange,
    /// Hour keys of the files that were loaded, ascending.
    pub files: Vec<HourKey>,
    pub skipped: Vec<SkippedFile>,
    pub records: Vec<AggregateRecord>,
}

impl RangeDataset {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load all aggregate files with `range.start <= key <= range.end`.
///
/// Returns `None` when no file qualifies or every qualifying file failed to parse.
pub fn load_range(layout: &StoreLayout, range: &DateRange) -> Option<RangeDataset> {
    if range.is_inverted() {
        warn!(start = %range.start, end = %range.end, "start is after end; nothing can match");
    }

    let candidates: Vec<(HourKey, PathBuf)> = layout
        .list_aggregates()
        .into_iter()
        .filter(|(key, _)| range.contains(key.datetime()))
        .collect();
    debug!(count = candidates.len(), "aggregate files in range");

    let parsed: Vec<_> = candidates
        .par_iter()
        .map(|(key, path)| (*key, path, read_aggregate_file(path)))
        .collect();

    let mut files = Vec::new();
    let mut skipped = Vec::new();
    let mut records = Vec::new();
    for (key, path, result) in parsed {
        match result {
            Ok(rows) => {
                files.push(key);
                records.extend(rows);
            }
            Err(reason) => {
                warn!(file = %path.display(), "skipping unreadable aggregate file: {reason}");
                skipped.push(SkippedFile {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }

    if records.is_empty() {
        info!(start = %range.start, end = %range.end, skipped = skipped.len(), "no data in range");
        return None;
    }

    info!(files = files.len(), rows = records.len(), skipped = skipped.len(), "range loaded");
    Some(RangeDataset {
        range: *range,
        files,
        skipped,
        records,
    })
}
