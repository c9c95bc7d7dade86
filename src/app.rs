//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up tracing and resolves the store layout
//! - runs the hourly aggregator (single hour or backfill)
//! - runs dashboard queries and prints reports/charts
//! - writes optional exports

use std::io;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::aggregate::{aggregate_hour, backfill};
use crate::cli::{AggregateArgs, BackfillArgs, Command, DashboardArgs, RangeArgs};
use crate::domain::{DashboardConfig, DateRange};
use crate::error::AppError;
use crate::plot::{AsciiView, SalesView};
use crate::store::StoreLayout;

pub mod pipeline;

const ENV_LOG: &str = "SALES_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let layout = StoreLayout::resolve(cli.store.logs_dir, cli.store.output_dir);

    match cli.command {
        Command::Aggregate(args) => handle_aggregate(&layout, args),
        Command::Backfill(args) => handle_backfill(&layout, args),
        Command::Dashboard(args) => handle_dashboard(&layout, args),
        Command::Tui(args) => handle_tui(&layout, args),
    }
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init_tracing(level: Option<&str>) {
    let directive = level
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_LOG).ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr));

    // Ignore error if already set.
    let _ = tracing::subscriber::set_global_default(registry);
}

fn handle_aggregate(layout: &StoreLayout, args: AggregateArgs) -> Result<(), AppError> {
    // Per-hour failures are reported, never turned into a non-zero exit.
    let result = aggregate_hour(layout, &args.hour_key);
    println!("{}", crate::report::format_hour_outcome(&result));
    Ok(())
}

fn handle_backfill(layout: &StoreLayout, args: BackfillArgs) -> Result<(), AppError> {
    if args.from > args.to {
        return Err(AppError::usage(format!(
            "Backfill range is empty: {} is after {}.",
            args.from, args.to
        )));
    }
    let report = backfill(layout, args.from, args.to);
    print!("{}", crate::report::format_backfill(&report));
    Ok(())
}

fn handle_dashboard(layout: &StoreLayout, args: DashboardArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args);

    let mut ascii = AsciiView::new(io::stdout(), config.plot_width, config.plot_height);
    let view: Option<&mut dyn SalesView> = if config.plot { Some(&mut ascii) } else { None };

    let Some(run) = pipeline::run_dashboard(layout, &config.range, view)? else {
        println!("No data found for the selected period.");
        return Ok(());
    };

    println!("{}", crate::report::format_summary(&run.dataset, &run.summary));

    if let Some(path) = &config.export {
        crate::io::export::write_summary_json(path, &run.dataset, &run.summary)?;
        println!("Summary exported to {}", path.display());
    }

    Ok(())
}

fn handle_tui(layout: &StoreLayout, args: RangeArgs) -> Result<(), AppError> {
    crate::tui::run(layout.clone(), DateRange::from_days(args.start, args.end))
}

pub fn dashboard_config_from_args(args: &DashboardArgs) -> DashboardConfig {
    DashboardConfig {
        range: DateRange::from_days(args.range.start, args.range.end),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export: args.export.clone(),
    }
}
