//! Raw partition ingest.
//!
//! Turns the pipe-delimited event files of one hour partition into clean
//! `SaleEvent`s.
//!
//! Design goals:
//! - **Fixed schema**: `date|article|price`, no header row
//! - **Best effort**: rows that do not fit the schema are dropped and counted, never reported one by one
//! - **Deterministic**: files are read in name order

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::domain::{truncate_to_hour, SaleEvent};
use crate::store::is_hidden_name;

/// Field delimiter for both raw and aggregate files.
pub const DELIMITER: u8 = b'|';

const RAW_FIELDS: usize = 3;

/// Ingest output: parsed events plus counters.
#[derive(Debug, Clone, Default)]
pub struct RawIngest {
    pub events: Vec<SaleEvent>,
    pub files_read: usize,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

/// Read every data file of a raw partition directory.
///
/// Only I/O failures are errors; malformed rows are dropped.
pub fn read_raw_partition(dir: &Path) -> io::Result<RawIngest> {
    let mut out = RawIngest::default();
    for path in partition_files(dir)? {
        read_raw_file(&path, &mut out)?;
        out.files_read += 1;
    }
    Ok(out)
}

fn partition_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| with_path(e, "Failed to list raw partition", dir))?
    {
        let entry = entry.map_err(|e| with_path(e, "Failed to list raw partition", dir))?;
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_none_or(is_hidden_name);
        if hidden || !path.is_file() {
            debug!(path = %path.display(), "ignoring non-data entry");
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

fn read_raw_file(path: &Path, out: &mut RawIngest) -> io::Result<()> {
    let file = File::open(path).map_err(|e| with_path(e, "Failed to open raw file", path))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                if is_blank(&record) {
                    continue;
                }
                out.rows_read += 1;
                match parse_event(&record) {
                    Ok(event) => out.events.push(event),
                    Err(reason) => {
                        out.rows_dropped += 1;
                        let line = record.position().map(|p| p.line()).unwrap_or(0);
                        debug!(file = %path.display(), line, "dropping row: {reason}");
                    }
                }
            }
            Err(e) if e.is_io_error() => {
                return Err(with_path(e.into(), "Failed to read raw file", path));
            }
            Err(e) => {
                // Invalid UTF-8 and similar record-level problems.
                out.rows_read += 1;
                out.rows_dropped += 1;
                debug!(file = %path.display(), "dropping undecodable row: {e}");
            }
        }
    }
    Ok(())
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Parse one raw row into an event truncated to its hour.
pub fn parse_event(record: &StringRecord) -> Result<SaleEvent, String> {
    if record.len() != RAW_FIELDS {
        return Err(format!("expected {RAW_FIELDS} fields, got {}", record.len()));
    }
    let timestamp = parse_timestamp(&record[0])?;
    let article = &record[1];
    if article.is_empty() {
        return Err("empty article".to_string());
    }
    // Raw rows are unquoted; a quote means the row is broken.
    if article.contains('"') {
        return Err(format!("quote in article '{article}'"));
    }
    let price = parse_price(&record[2])?;
    Ok(SaleEvent {
        hour: truncate_to_hour(timestamp),
        article: article.to_string(),
        price,
    })
}

fn parse_price(s: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("invalid price '{s}'"))?;
    if v.is_finite() { Ok(v) } else { Err(format!("non-finite price '{s}'")) }
}

/// Parse a raw event timestamp.
///
/// Upstream producers emit ISO-like timestamps, but not always the same variant,
/// so we accept a small fixed set. Offsets are dropped (wall-clock time is kept).
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    const FMTS: [&str; 9] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%Y%m%d%H%M%S",
    ];
    for fmt in FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_time(chrono::NaiveTime::MIN));
    }
    Err(format!("invalid timestamp '{s}'"))
}

fn with_path(e: io::Error, what: &str, path: &Path) -> io::Error {
    io::Error::new(e.kind(), format!("{what} '{}': {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn parses_well_formed_row_and_truncates_hour() {
        let ev = parse_event(&record(&["2024-11-20 14:37:12", "shoes", "19.99"])).unwrap();
        assert_eq!(ev.hour.to_string(), "2024-11-20 14:00:00");
        assert_eq!(ev.article, "shoes");
        assert!((ev.price - 19.99).abs() < 1e-12);
    }

    #[test]
    fn rejects_schema_violations() {
        assert!(parse_event(&record(&["2024-11-20 14:37:12", "shoes"])).is_err());
        assert!(parse_event(&record(&["2024-11-20 14:37:12", "shoes", "1", "x"])).is_err());
        assert!(parse_event(&record(&["2024-11-20 14:37:12", "shoes", "abc"])).is_err());
        assert!(parse_event(&record(&["2024-11-20 14:37:12", "shoes", "NaN"])).is_err());
        assert!(parse_event(&record(&["yesterday", "shoes", "1.0"])).is_err());
        assert!(parse_event(&record(&["2024-11-20 14:37:12", "", "1.0"])).is_err());
    }

    #[test]
    fn accepts_common_timestamp_variants() {
        for s in [
            "2024-11-20 14:05:00",
            "2024-11-20 14:05:00.250",
            "2024-11-20T14:05:00",
            "2024-11-20T14:05:00+01:00",
            "2024-11-20 14:05",
            "2024/11/20 14:05:00",
        ] {
            let dt = parse_timestamp(s).unwrap_or_else(|e| panic!("{s}: {e}"));
            assert_eq!(truncate_to_hour(dt).to_string(), "2024-11-20 14:00:00", "{s}");
        }
        assert_eq!(
            parse_timestamp("2024-11-20").unwrap().to_string(),
            "2024-11-20 00:00:00"
        );
    }

    #[test]
    fn reads_directory_and_counts_drops() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("part-00000"),
            "2024-11-20 14:01:00|A|2.5\n\n2024-11-20 14:02:00|B|x\n2024-11-20 14:03:00|A|1.5\n",
        )
        .unwrap();
        fs::write(dir.path().join("part-00001"), "2024-11-20 14:04:00|B|4\nbroken\n").unwrap();
        fs::write(dir.path().join("_SUCCESS"), "2024-11-20 14:04:00|Z|100\n").unwrap();
        fs::write(dir.path().join(".part-00000.crc"), "junk").unwrap();

        let ingest = read_raw_partition(dir.path()).unwrap();
        assert_eq!(ingest.files_read, 2);
        assert_eq!(ingest.rows_read, 5);
        assert_eq!(ingest.rows_dropped, 2);
        let articles: Vec<&str> = ingest.events.iter().map(|e| e.article.as_str()).collect();
        assert_eq!(articles, vec!["A", "A", "B"]);
    }

    #[test]
    fn stray_quote_drops_only_its_own_row() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("part-00000"),
            "2024-11-20 14:01:00|A|1\n2024-11-20 14:02:00|\"B|2\n2024-11-20 14:03:00|A|3\n2024-11-20 14:04:00|C|4\n",
        )
        .unwrap();

        let ingest = read_raw_partition(dir.path()).unwrap();
        assert_eq!(ingest.rows_read, 4);
        assert_eq!(ingest.rows_dropped, 1);
        let total: f64 = ingest.events.iter().map(|e| e.price).sum();
        assert_eq!(total, 8.0);
        let articles: Vec<&str> = ingest.events.iter().map(|e| e.article.as_str()).collect();
        assert_eq!(articles, vec!["A", "A", "C"]);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_raw_partition(&dir.path().join("absent")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
