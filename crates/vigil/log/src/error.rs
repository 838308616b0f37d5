//! Logging error types

use thiserror::Error;

/// Errors from log destination management.
///
/// Write failures during ordinary logging are contained inside the
/// [`Logger`](crate::Logger) and never surface here; only explicit
/// destination operations return errors.
#[derive(Debug, Error)]
pub enum LogError {
    /// `open_log` was called with no explicit stream and no attached path.
    #[error("no log destination: no stream given and no path attached")]
    NoDestination,

    /// Opening or closing the destination failed.
    #[error("log destination i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for log destination operations.
pub type Result<T> = std::result::Result<T, LogError>;
