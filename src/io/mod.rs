//! Input/output helpers.
//!
//! - raw partition ingest + validation (`ingest`)
//! - aggregate file read/write (`aggregate_file`)
//! - summary exports (JSON) (`export`)

pub mod aggregate_file;
pub mod export;
pub mod ingest;

pub use aggregate_file::*;
pub use export::*;
pub use ingest::*;
