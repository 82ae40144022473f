//! Error taxonomy for the engine crate.
//!
//! `Leak` is fatal and always aborts a run: it means the no-future-data
//! guarantee was violated. `NotFound` is recoverable: the driver skips the
//! affected day or instrument and records the skip in the day report.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    /// A row dated beyond the permitted cutoff reached the loader.
    #[error("data leak in {path}: row at {ts} lies beyond cutoff {cutoff}")]
    Leak {
        path: String,
        ts: NaiveDateTime,
        cutoff: NaiveDate,
    },

    /// No file or series exists for the requested day or instrument.
    #[error("no data found for {what}")]
    NotFound { what: String },

    /// A structurally broken file (bad header, not row-level noise).
    #[error("malformed data in {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl DataError {
    /// Recoverable errors let the driver skip a day/instrument and carry on;
    /// everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DataError::NotFound { .. })
    }
}
