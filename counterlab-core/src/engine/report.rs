//! Run outcome and per-day reporting.
//!
//! Zero-activity day/instrument combinations are reported, never silently
//! dropped, so operators can tell "no opportunity" apart from "broken
//! input".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Level, Trade};

/// What happened on one simulated business day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    /// Instruments that ran the state machine.
    pub simulated: Vec<String>,
    /// Universe instruments with no order-book data this day.
    pub missing_data: Vec<String>,
    /// Simulated instruments that produced no trades.
    pub zero_trades: Vec<String>,
    /// Simulated instruments for which no levels were generated.
    pub zero_levels: Vec<String>,
    /// Whole-day skip: no order-book directory existed.
    pub skipped: bool,
    /// Input rows dropped for unparseable timestamps or values.
    pub dropped_rows: usize,
    /// Snapshots dropped for missing best quotes.
    pub unusable_snapshots: usize,
    pub trade_count: usize,
    pub level_count: usize,
}

impl DayReport {
    pub fn skipped_day(date: NaiveDate) -> Self {
        Self {
            date,
            simulated: Vec::new(),
            missing_data: Vec::new(),
            zero_trades: Vec::new(),
            zero_levels: Vec::new(),
            skipped: true,
            dropped_rows: 0,
            unusable_snapshots: 0,
            trade_count: 0,
            level_count: 0,
        }
    }
}

/// Everything a simulation run produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOutcome {
    /// All closed trades, ordered by (entry_ts, symbol).
    pub trades: Vec<Trade>,
    /// Every level generated across the run, tagged with its day.
    pub levels: Vec<Level>,
    /// One report per business day in the range.
    pub days: Vec<DayReport>,
}

impl RunOutcome {
    pub fn trades_for<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a Trade> + 'a {
        self.trades.iter().filter(move |t| t.symbol == symbol)
    }
}
