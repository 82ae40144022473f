//! Trade — a completed round-trip, the sole output unit of the simulation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::level::LevelKind;
use super::position::{Direction, Position};

/// Why a position was closed.
///
/// Session-boundary and end-of-data force-closes are tagged
/// `HoldTimeLimit`: the position ran out of time, whichever clock expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    ProfitTarget,
    StopLoss,
    HoldTimeLimit,
    ReversalSignal,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ProfitTarget => "profit_target",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::HoldTimeLimit => "hold_time_limit",
            ExitReason::ReversalSignal => "reversal_signal",
        }
    }
}

/// Immutable record of one entry → exit round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub direction: Direction,

    pub entry_ts: NaiveDateTime,
    pub entry_price: f64,
    pub exit_ts: NaiveDateTime,
    pub exit_price: f64,

    pub exit_reason: ExitReason,
    /// Favorable-is-positive PnL in ticks.
    pub pnl_ticks: f64,
    pub bars_held: usize,

    /// The level that originated the entry.
    pub level_price: f64,
    pub level_kind: LevelKind,
}

impl Trade {
    /// Close a position at the given row, producing the trade record.
    pub fn close(position: &Position, exit_ts: NaiveDateTime, exit_price: f64, reason: ExitReason) -> Self {
        Trade {
            symbol: position.symbol.clone(),
            direction: position.direction,
            entry_ts: position.entry_ts,
            entry_price: position.entry_price,
            exit_ts,
            exit_price,
            exit_reason: reason,
            pnl_ticks: position.pnl_ticks(exit_price),
            bars_held: position.bars_held,
            level_price: position.level_price,
            level_kind: position.level_kind,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl_ticks > 0.0
    }
}
