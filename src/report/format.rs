//! Formatted terminal output for aggregation runs and dashboard summaries.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays free of presentation concerns
//! - output changes are localized (snapshot-style tests below)

use crate::aggregate::{BackfillReport, HourOutcome};
use crate::domain::SalesSummary;
use crate::error::AggregateError;
use crate::query::RangeDataset;

/// One line describing what `aggregate_hour` did.
pub fn format_hour_outcome(result: &Result<HourOutcome, AggregateError>) -> String {
    match result {
        Ok(HourOutcome::Written {
            key,
            path,
            rows_written,
            counts,
        }) => format!(
            "{key}: wrote {rows_written} row(s) to {} ({} read, {} dropped)",
            path.display(),
            counts.rows_read,
            counts.rows_dropped
        ),
        Ok(HourOutcome::NoData { key, counts }) => format!(
            "{key}: no valid rows ({} read, {} dropped); nothing written",
            counts.rows_read, counts.rows_dropped
        ),
        Err(AggregateError::PartitionNotFound { key, path }) => {
            format!("{key}: raw partition {} does not exist; skipped", path.display())
        }
        Err(err @ AggregateError::Processing { .. }) => format!("{err} (recorded in error log)"),
    }
}

/// Per-hour lines followed by a tally.
pub fn format_backfill(report: &BackfillReport) -> String {
    let mut out = String::new();
    for result in &report.results {
        out.push_str(&format_hour_outcome(result));
        out.push('\n');
    }
    out.push_str(&format!(
        "\nhours={} written={} no_data={} missing={} failed={}\n",
        report.results.len(),
        report.written(),
        report.no_data(),
        report.missing(),
        report.failed()
    ));
    out
}

/// Range header, load diagnostics, and both tables.
pub fn format_summary(dataset: &RangeDataset, summary: &SalesSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== sales: {} .. {} ===\n",
        dataset.range.start_day(),
        dataset.range.end_day()
    ));
    out.push_str(&format!(
        "Files: {} loaded, {} skipped | rows={} | total={:.2}\n",
        dataset.files.len(),
        dataset.skipped.len(),
        dataset.records.len(),
        summary.grand_total()
    ));
    for s in &dataset.skipped {
        out.push_str(&format!("  (skipped {}) {}\n", s.path.display(), s.reason));
    }

    let article_width = summary
        .by_article
        .iter()
        .map(|a| a.article.chars().count())
        .max()
        .unwrap_or(0)
        .max("article".len());

    out.push_str("\nTotal sales by article:\n");
    out.push_str(&format!("{:<article_width$}  {:>12}\n", "article", "total_sales"));
    for a in &summary.by_article {
        out.push_str(&format!("{:<article_width$}  {:>12.2}\n", a.article, a.total_sales));
    }

    out.push_str("\nTotal sales by hour:\n");
    out.push_str(&format!("{:<13}  {:>12}\n", "hour", "total_sales"));
    for h in &summary.by_time {
        out.push_str(&format!("{:<13}  {:>12.2}\n", h.label(), h.total_sales));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use crate::aggregate::ReadCounts;
    use crate::domain::{AggregateRecord, DateRange, HourKey};
    use crate::report::summarize;

    #[test]
    fn summary_tables_snapshot() {
        let d0 = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 11, 21).unwrap();
        let ds = RangeDataset {
            range: DateRange::from_days(d0, d1),
            files: vec![HourKey::parse("2024112010").unwrap(), HourKey::parse("2024112110").unwrap()],
            skipped: Vec::new(),
            records: vec![
                AggregateRecord {
                    formatted_date: "2024/11/20 10".to_string(),
                    article: "A".to_string(),
                    total_sales: 5.0,
                },
                AggregateRecord {
                    formatted_date: "2024/11/21 10".to_string(),
                    article: "A".to_string(),
                    total_sales: 7.0,
                },
            ],
        };
        let summary = summarize(&ds).unwrap();

        let expected = concat!(
            "=== sales: 2024-11-20 .. 2024-11-21 ===\n",
            "Files: 2 loaded, 0 skipped | rows=2 | total=12.00\n",
            "\n",
            "Total sales by article:\n",
            "article   total_sales\n",
            "A               12.00\n",
            "\n",
            "Total sales by hour:\n",
            "hour            total_sales\n",
            "2024/11/20 10          5.00\n",
            "2024/11/21 10          7.00\n",
        );
        assert_eq!(format_summary(&ds, &summary), expected);
    }

    #[test]
    fn outcome_lines() {
        let key = HourKey::parse("2024112014").unwrap();
        let written = Ok(HourOutcome::Written {
            key,
            path: PathBuf::from("output/2024112014.txt"),
            rows_written: 2,
            counts: ReadCounts { files_read: 1, rows_read: 3, rows_dropped: 1 },
        });
        assert_eq!(
            format_hour_outcome(&written),
            "2024112014: wrote 2 row(s) to output/2024112014.txt (3 read, 1 dropped)"
        );

        let missing = Err(AggregateError::PartitionNotFound {
            key,
            path: PathBuf::from("logs/2024112014"),
        });
        assert_eq!(
            format_hour_outcome(&missing),
            "2024112014: raw partition logs/2024112014 does not exist; skipped"
        );
    }
}
