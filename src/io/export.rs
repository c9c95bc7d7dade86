//! Export a dashboard summary to JSON.
//!
//! The export carries the selected window, what was loaded, and both series, so it
//! can be charted elsewhere without rereading the store.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{ArticleTotal, HourTotal, SalesSummary};
use crate::error::AppError;
use crate::query::RangeDataset;

#[derive(Debug, Serialize)]
struct SummaryFile<'a> {
    tool: &'static str,
    start: NaiveDate,
    end: NaiveDate,
    files_loaded: Vec<String>,
    rows_loaded: usize,
    grand_total: f64,
    by_article: &'a [ArticleTotal],
    by_time: Vec<HourRow>,
}

#[derive(Debug, Serialize)]
struct HourRow {
    hour: String,
    total_sales: f64,
}

impl From<&HourTotal> for HourRow {
    fn from(h: &HourTotal) -> Self {
        Self {
            hour: h.label(),
            total_sales: h.total_sales,
        }
    }
}

/// Write the summary JSON file.
pub fn write_summary_json(path: &Path, dataset: &RangeDataset, summary: &SalesSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::runtime(format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let export = SummaryFile {
        tool: "sales",
        start: dataset.range.start_day(),
        end: dataset.range.end_day(),
        files_loaded: dataset.files.iter().map(ToString::to_string).collect(),
        rows_loaded: dataset.records.len(),
        grand_total: summary.grand_total(),
        by_article: &summary.by_article,
        by_time: summary.by_time.iter().map(HourRow::from).collect(),
    };

    serde_json::to_writer_pretty(file, &export)
        .map_err(|e| AppError::runtime(format!("Failed to write export JSON: {e}")))?;

    Ok(())
}
