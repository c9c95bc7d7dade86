//! Presentation aggregation and report formatting.
//!
//! `summarize` collapses a range dataset into the two series the views draw.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::domain::{parse_formatted_hour, ArticleTotal, HourTotal, SalesSummary};
use crate::error::AppError;
use crate::query::RangeDataset;

pub mod format;

pub use format::*;

/// Total sales per article (descending) and per hour (chronological).
///
/// Every `formatted_date` must parse; the loader only hands over rows written by the
/// aggregator, so a failure here means the store is corrupt and is a hard error.
pub fn summarize(dataset: &RangeDataset) -> Result<SalesSummary, AppError> {
    if dataset.is_empty() {
        return Err(AppError::runtime("Cannot summarize an empty dataset."));
    }

    let mut per_article: BTreeMap<&str, f64> = BTreeMap::new();
    let mut per_hour: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();

    for r in &dataset.records {
        let hour = parse_formatted_hour(&r.formatted_date)
            .map_err(|e| AppError::runtime(format!("Corrupt aggregate row for '{}': {e}", r.article)))?;
        *per_article.entry(r.article.as_str()).or_insert(0.0) += r.total_sales;
        *per_hour.entry(hour).or_insert(0.0) += r.total_sales;
    }

    // Stable sort under a total order: equal totals keep ascending article order.
    let mut by_article: Vec<ArticleTotal> = per_article
        .into_iter()
        .map(|(article, total_sales)| ArticleTotal {
            article: article.to_string(),
            total_sales,
        })
        .collect();
    by_article.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));

    let by_time = per_hour
        .into_iter()
        .map(|(hour, total_sales)| HourTotal { hour, total_sales })
        .collect();

    Ok(SalesSummary { by_article, by_time })
}
