//! Error types.
//!
//! - `AppError`: process-level failure carrying the exit code `sales` terminates with.
//! - `AggregateError`: failure of a single hourly aggregation. Never fatal to the process;
//!   callers report it and move on to the next hour.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::HourKey;

/// Exit code for invocation-contract violations (bad arguments, bad key/date format).
pub const EXIT_USAGE: u8 = 2;
/// Exit code for broken internal invariants and terminal/export failures.
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Errors from aggregating one hour partition.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The raw input directory for the hour does not exist.
    #[error("Raw partition for {key} not found at '{}'", path.display())]
    PartitionNotFound { key: HourKey, path: PathBuf },

    /// Reading, reducing, or writing failed. Already recorded in the error log.
    #[error("Processing {key} failed: {message}")]
    Processing { key: HourKey, message: String },
}

impl AggregateError {
    pub fn key(&self) -> &HourKey {
        match self {
            Self::PartitionNotFound { key, .. } | Self::Processing { key, .. } => key,
        }
    }
}
