//! Read/write hourly aggregate files.
//!
//! An aggregate file is the durable unit of the store: `formatted_date|article|total_sales`
//! rows, no header, no index column. Totals are written with the shortest
//! representation that parses back to the same `f64`.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::domain::AggregateRecord;
use crate::io::ingest::DELIMITER;

const AGGREGATE_FIELDS: usize = 3;

/// Write `records` to `temp`, fsync, then rename over `target`.
///
/// Readers see either the previous file or the complete new one. On failure the
/// temp file is removed and `target` is left untouched.
pub fn write_aggregate_atomic(target: &Path, temp: &Path, records: &[AggregateRecord]) -> io::Result<()> {
    let result = write_records(temp, records).and_then(|()| fs::rename(temp, target));
    if result.is_err() {
        let _ = fs::remove_file(temp);
    }
    result
}

fn write_records(path: &Path, records: &[AggregateRecord]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .from_writer(file);

    for r in records {
        let total = format_total(r.total_sales);
        writer.write_record([r.formatted_date.as_str(), r.article.as_str(), total.as_str()])?;
    }

    let file = writer
        .into_inner()
        .map_err(|e| io::Error::other(format!("Failed to flush aggregate file: {}", e.error())))?;
    file.sync_all()
}

/// `12.0` rather than `12`, so totals always read as floating point.
pub fn format_total(v: f64) -> String {
    format!("{v:?}")
}

/// Read an aggregate file.
///
/// Any row with the wrong arity or a non-numeric or non-finite total fails the whole
/// file, as does a file with no rows.
pub fn read_aggregate_file(path: &Path) -> Result<Vec<AggregateRecord>, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open '{}': {e}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        let record = result.map_err(|e| format!("line {line}: {e}"))?;
        if record.len() != AGGREGATE_FIELDS {
            return Err(format!(
                "line {line}: expected {AGGREGATE_FIELDS} fields, got {}",
                record.len()
            ));
        }
        let total_raw = record[2].trim();
        let total_sales = total_raw
            .parse::<f64>()
            .map_err(|_| format!("line {line}: invalid total_sales '{total_raw}'"))?;
        if !total_sales.is_finite() {
            return Err(format!("line {line}: non-finite total_sales '{total_raw}'"));
        }
        out.push(AggregateRecord {
            formatted_date: record[0].to_string(),
            article: record[1].to_string(),
            total_sales,
        });
    }

    if out.is_empty() {
        return Err("file contains no rows".to_string());
    }
    Ok(out)
}
