//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - partition identity (`HourKey`) and query windows (`DateRange`)
//! - raw and aggregated sales rows (`SaleEvent`, `AggregateRecord`)
//! - presentation series (`SalesSummary`, `ArticleTotal`, `HourTotal`)

pub mod types;

pub use types::*;
