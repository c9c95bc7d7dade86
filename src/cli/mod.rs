//! Command-line parsing for the sales rollup.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation/query code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{parse_day, HourKey};

/// Hour processed by `sales aggregate` when none is given.
pub const DEFAULT_HOUR_KEY: &str = "2024112014";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Hourly sales aggregation and range dashboard")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Tracing filter (e.g. `info`, `sales_rollup=debug`). Falls back to `SALES_LOG`, then `warn`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate one hour partition into `<output>/<HOUR_KEY>.txt`.
    Aggregate(AggregateArgs),
    /// Aggregate every hour between two keys (inclusive).
    Backfill(BackfillArgs),
    /// Print total sales by article and over time for a date range.
    Dashboard(DashboardArgs),
    /// Launch the interactive dashboard.
    Tui(RangeArgs),
}

/// Store location overrides shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    /// Root of the raw `<HOUR_KEY>/` partitions (env: SALES_LOGS_DIR, default ./logs).
    #[arg(long, global = true, value_name = "DIR")]
    pub logs_dir: Option<PathBuf>,

    /// Root of the aggregate files and error log (env: SALES_OUTPUT_DIR, default ./output).
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct AggregateArgs {
    /// Hour to process, as YYYYMMDDHH.
    #[arg(default_value = DEFAULT_HOUR_KEY, value_parser = HourKey::parse)]
    pub hour_key: HourKey,
}

#[derive(Debug, Args, Clone)]
pub struct BackfillArgs {
    /// First hour, as YYYYMMDDHH.
    #[arg(value_parser = HourKey::parse)]
    pub from: HourKey,

    /// Last hour (inclusive), as YYYYMMDDHH.
    #[arg(value_parser = HourKey::parse)]
    pub to: HourKey,
}

/// Inclusive day range.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// First day, as YYYYMMDD (e.g. 20241119).
    #[arg(value_parser = parse_day)]
    pub start: NaiveDate,

    /// Last day (inclusive), as YYYYMMDD.
    #[arg(value_parser = parse_day)]
    pub end: NaiveDate,
}

#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Disable the terminal charts (tables only).
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Line chart height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,

    /// Export the summary (both series) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_defaults_hour_key() {
        let cli = Cli::try_parse_from(["sales", "aggregate"]).unwrap();
        let Command::Aggregate(args) = cli.command else { panic!("expected aggregate") };
        assert_eq!(args.hour_key.to_string(), DEFAULT_HOUR_KEY);
    }

    #[test]
    fn dashboard_parses_dates_and_globals() {
        let cli = Cli::try_parse_from([
            "sales", "dashboard", "20241120", "20241121", "--output-dir", "/tmp/out", "--no-plot",
        ])
        .unwrap();
        assert_eq!(cli.store.output_dir, Some(PathBuf::from("/tmp/out")));
        let Command::Dashboard(args) = cli.command else { panic!("expected dashboard") };
        assert_eq!(args.range.start, NaiveDate::from_ymd_opt(2024, 11, 20).unwrap());
        assert!(args.no_plot);
    }

    #[test]
    fn usage_errors_exit_non_zero() {
        let bad_date = Cli::try_parse_from(["sales", "dashboard", "2024-11-20", "20241121"]).unwrap_err();
        assert_ne!(bad_date.exit_code(), 0);

        let missing = Cli::try_parse_from(["sales", "dashboard", "20241120"]).unwrap_err();
        assert_ne!(missing.exit_code(), 0);

        let bad_key = Cli::try_parse_from(["sales", "aggregate", "2024112099"]).unwrap_err();
        assert_ne!(bad_key.exit_code(), 0);
    }
}
