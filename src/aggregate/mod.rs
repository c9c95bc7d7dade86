//! Hourly aggregation: one raw partition in, one compacted aggregate file out.
//!
//! `aggregate_hour` is the only writer of the partition store. Each call fully
//! completes (written, no-op, or logged failure) before returning and never panics
//! on bad input. Calls for different keys touch disjoint paths and may run in
//! parallel (`backfill`); calls for the same key must be serialized by the caller.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::domain::HourKey;
use crate::error::AggregateError;
use crate::io::{read_raw_partition, write_aggregate_atomic};
use crate::store::{ensure_dir, StoreLayout};

pub mod backfill;
pub mod reduce;

pub use backfill::{backfill, BackfillReport};
pub use reduce::reduce;

/// Row counters from reading one raw partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadCounts {
    pub files_read: usize,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

/// Non-error result of aggregating one hour.
#[derive(Debug, Clone, PartialEq)]
pub enum HourOutcome {
    /// An aggregate file was written (replacing any previous one).
    Written {
        key: HourKey,
        path: PathBuf,
        rows_written: usize,
        counts: ReadCounts,
    },
    /// No valid rows in the partition; nothing was written.
    NoData { key: HourKey, counts: ReadCounts },
}

impl HourOutcome {
    pub fn key(&self) -> &HourKey {
        match self {
            Self::Written { key, .. } | Self::NoData { key, .. } => key,
        }
    }
}

/// Aggregate one hour partition into `<output>/<key>.txt`.
pub fn aggregate_hour(layout: &StoreLayout, key: &HourKey) -> Result<HourOutcome, AggregateError> {
    let input_dir = layout.raw_partition_dir(key);
    if !input_dir.is_dir() {
        warn!(%key, dir = %input_dir.display(), "raw partition not found");
        return Err(AggregateError::PartitionNotFound {
            key: *key,
            path: input_dir,
        });
    }

    match process(layout, key) {
        Ok(outcome) => Ok(outcome),
        Err(message) => {
            error!(%key, "aggregation failed: {message}");
            record_failure(layout, key, &message);
            Err(AggregateError::Processing { key: *key, message })
        }
    }
}

fn process(layout: &StoreLayout, key: &HourKey) -> Result<HourOutcome, String> {
    let ingest = read_raw_partition(&layout.raw_partition_dir(key)).map_err(|e| e.to_string())?;
    let counts = ReadCounts {
        files_read: ingest.files_read,
        rows_read: ingest.rows_read,
        rows_dropped: ingest.rows_dropped,
    };

    if ingest.events.is_empty() {
        info!(%key, rows_read = counts.rows_read, "no valid rows; nothing written");
        return Ok(HourOutcome::NoData { key: *key, counts });
    }

    let records = reduce(&ingest.events)?;

    ensure_dir(&layout.output_root).map_err(|e| {
        format!(
            "Failed to create output directory '{}': {e}",
            layout.output_root.display()
        )
    })?;

    let path = layout.aggregate_path(key);
    write_aggregate_atomic(&path, &layout.temp_path(key), &records)
        .map_err(|e| format!("Failed to write '{}': {e}", path.display()))?;

    info!(
        %key,
        path = %path.display(),
        rows = records.len(),
        dropped = counts.rows_dropped,
        "aggregate written"
    );

    Ok(HourOutcome::Written {
        key: *key,
        path,
        rows_written: records.len(),
        counts,
    })
}

/// Append `<key>: <message>` to the shared error log. Failures here are only traced.
fn record_failure(layout: &StoreLayout, key: &HourKey, message: &str) {
    let line = format!("{key}: {}\n", message.replace(['\n', '\r'], " "));
    let path = layout.error_log_path();
    let result = ensure_dir(&layout.output_root).and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?
            .write_all(line.as_bytes())
    });
    if let Err(e) = result {
        error!(%key, log = %path.display(), "cannot append to error log: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup(raw: &[(&str, &str)]) -> (tempfile::TempDir, StoreLayout, HourKey) {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path().join("logs"), dir.path().join("output"));
        let key = HourKey::parse("2024112014").unwrap();
        let part = layout.raw_partition_dir(&key);
        fs::create_dir_all(&part).unwrap();
        for (name, body) in raw {
            fs::write(part.join(name), body).unwrap();
        }
        (dir, layout, key)
    }

    #[test]
    fn writes_one_row_per_article() {
        let (_dir, layout, key) = setup(&[(
            "part-0",
            "2024-11-20 14:01:00|A|2\n2024-11-20 14:02:00|B|3\n2024-11-20 14:03:00|A|5\n",
        )]);

        let outcome = aggregate_hour(&layout, &key).unwrap();
        let HourOutcome::Written { rows_written, counts, path, .. } = outcome else {
            panic!("expected a written outcome");
        };
        assert_eq!(rows_written, 2);
        assert_eq!(counts.rows_read, 3);
        assert_eq!(path, layout.aggregate_path(&key));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "2024/11/20 14|A|7.0\n2024/11/20 14|B|3.0\n"
        );
        assert!(!layout.temp_path(&key).exists());
    }

    #[test]
    fn missing_partition_is_reported_without_logging() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path().join("logs"), dir.path().join("output"));
        let key = HourKey::parse("2024112014").unwrap();

        let err = aggregate_hour(&layout, &key).unwrap_err();
        assert!(matches!(err, AggregateError::PartitionNotFound { .. }));
        assert!(!layout.error_log_path().exists());
        assert!(!layout.aggregate_path(&key).exists());
    }

    #[test]
    fn all_malformed_rows_is_a_no_op() {
        let (_dir, layout, key) = setup(&[("part-0", "garbage\n2024-11-20 14:00:00|A|abc\n")]);

        let outcome = aggregate_hour(&layout, &key).unwrap();
        assert_eq!(
            outcome,
            HourOutcome::NoData {
                key,
                counts: ReadCounts { files_read: 1, rows_read: 2, rows_dropped: 2 },
            }
        );
        assert!(!layout.aggregate_path(&key).exists());
    }

    #[test]
    fn rerun_is_idempotent() {
        let (_dir, layout, key) = setup(&[
            ("part-0", "2024-11-20 14:01:00|A|1.1\n2024-11-20 14:02:00|B|2.2\n"),
            ("part-1", "2024-11-20 14:03:00|A|3.3\n"),
        ]);

        aggregate_hour(&layout, &key).unwrap();
        let first = fs::read(layout.aggregate_path(&key)).unwrap();
        aggregate_hour(&layout, &key).unwrap();
        let second = fs::read(layout.aggregate_path(&key)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn write_failure_is_logged_and_leaves_no_partial_file() {
        let (_dir, layout, key) = setup(&[("part-0", "2024-11-20 14:01:00|A|1\n")]);
        // A directory squatting on the target path makes the final rename fail.
        let target = layout.aggregate_path(&key);
        fs::create_dir_all(target.join("occupied")).unwrap();

        let err = aggregate_hour(&layout, &key).unwrap_err();
        assert!(matches!(err, AggregateError::Processing { .. }));

        let log = fs::read_to_string(layout.error_log_path()).unwrap();
        assert!(log.starts_with("2024112014: "));
        assert_eq!(log.lines().count(), 1);
        assert!(!layout.temp_path(&key).exists());
    }

    #[test]
    fn overflowing_total_is_logged_and_nothing_is_written() {
        let (_dir, layout, key) = setup(&[(
            "part-0",
            "2024-11-20 14:01:00|A|1e308\n2024-11-20 14:02:00|A|1e308\n",
        )]);

        let err = aggregate_hour(&layout, &key).unwrap_err();
        assert!(matches!(err, AggregateError::Processing { .. }));
        assert!(!layout.aggregate_path(&key).exists());
        let log = fs::read_to_string(layout.error_log_path()).unwrap();
        assert!(log.contains("not finite"), "{log}");
    }
}
