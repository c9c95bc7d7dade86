//! `sales-rollup` library crate.
//!
//! The binary (`sales`) is a thin wrapper around this library so that:
//!
//! - the aggregator and range loader are testable without spawning processes
//! - the dashboard pipeline is shared by the printed report and the TUI

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod query;
pub mod report;
pub mod store;
pub mod tui;
