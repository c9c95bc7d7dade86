//! Shared domain types.
//!
//! These types are intentionally kept small and cheap to clone so they can be:
//!
//! - passed between the aggregator, the range loader, and the presentation layer
//! - exported to JSON
//! - rendered by the terminal views

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

/// chrono pattern for the hour label stored in aggregate files (`YYYY/MM/DD HH`).
pub const FORMATTED_HOUR_FMT: &str = "%Y/%m/%d %H";

/// Canonical `YYYYMMDDHH` identifier of one ingestion/aggregation partition.
///
/// Always holds a timestamp truncated to the hour, so `to_string()` round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourKey(NaiveDateTime);

impl HourKey {
    /// Parse a `YYYYMMDDHH` string.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("Invalid hour key '{s}'. Expected YYYYMMDDHH (e.g. 2024112014)."));
        }
        let date = parse_ymd_digits(&s[..8])
            .ok_or_else(|| format!("Invalid hour key '{s}': not a calendar date."))?;
        let hour: u32 = s[8..]
            .parse()
            .map_err(|_| format!("Invalid hour key '{s}': bad hour."))?;
        let dt = date
            .and_hms_opt(hour, 0, 0)
            .ok_or_else(|| format!("Invalid hour key '{s}': hour must be 00-23."))?;
        Ok(Self(dt))
    }

    /// Key for the hour containing `dt` (minutes/seconds discarded).
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self(truncate_to_hour(dt))
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// The key rendered as the `YYYY/MM/DD HH` label used inside aggregate files.
    pub fn formatted(&self) -> String {
        self.0.format(FORMATTED_HOUR_FMT).to_string()
    }

    /// The following hour.
    pub fn next(&self) -> Self {
        Self(self.0 + chrono::Duration::hours(1))
    }
}

impl fmt::Display for HourKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d%H"))
    }
}

impl FromStr for HourKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse a `YYYYMMDD` date as accepted on the dashboard command line.
pub fn parse_day(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("Invalid date '{s}'. Dates must be YYYYMMDD (e.g. 20241119)."));
    }
    parse_ymd_digits(s).ok_or_else(|| format!("Invalid date '{s}': not a calendar date."))
}

/// Parse a `YYYY/MM/DD HH` label back into its hour timestamp.
pub fn parse_formatted_hour(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    let (date, hour) = s
        .split_once(' ')
        .ok_or_else(|| format!("Invalid hour label '{s}'. Expected YYYY/MM/DD HH."))?;
    let date = NaiveDate::parse_from_str(date, "%Y/%m/%d")
        .map_err(|e| format!("Invalid hour label '{s}': {e}"))?;
    if hour.len() != 2 {
        return Err(format!("Invalid hour label '{s}': hour must be two digits."));
    }
    let hour: u32 = hour
        .parse()
        .map_err(|_| format!("Invalid hour label '{s}': bad hour."))?;
    date.and_hms_opt(hour, 0, 0)
        .ok_or_else(|| format!("Invalid hour label '{s}': hour must be 00-23."))
}

pub fn truncate_to_hour(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date()
        .and_hms_opt(dt.hour(), 0, 0)
        .unwrap_or(dt)
}

fn parse_ymd_digits(s: &str) -> Option<NaiveDate> {
    let year: i32 = s.get(..4)?.parse().ok()?;
    let month: u32 = s.get(4..6)?.parse().ok()?;
    let day: u32 = s.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Inclusive `[start, end]` window over hour-key timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Whole-day window: `start 00:00:00` through `end 23:59:59`.
    pub fn from_days(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(end_of_day()),
        }
    }

    pub fn start_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_day(&self) -> NaiveDate {
        self.end.date()
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// One parsed raw sale event, already truncated to its hour.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleEvent {
    pub hour: NaiveDateTime,
    pub article: String,
    pub price: f64,
}

/// One `(hour, article)` total: the persisted unit of an aggregate file.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord {
    pub formatted_date: String,
    pub article: String,
    pub total_sales: f64,
}

/// Total sales of one article across the whole selected range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleTotal {
    pub article: String,
    pub total_sales: f64,
}

/// Total sales of all articles within one hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourTotal {
    pub hour: NaiveDateTime,
    pub total_sales: f64,
}

impl HourTotal {
    pub fn label(&self) -> String {
        self.hour.format(FORMATTED_HOUR_FMT).to_string()
    }
}

/// The two series handed to a view.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    /// Sorted descending by total; ties keep ascending article order.
    pub by_article: Vec<ArticleTotal>,
    /// Chronological.
    pub by_time: Vec<HourTotal>,
}

impl SalesSummary {
    pub fn grand_total(&self) -> f64 {
        self.by_article.iter().map(|a| a.total_sales).sum()
    }
}

/// A dashboard run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub range: DateRange,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export: Option<PathBuf>,
}
