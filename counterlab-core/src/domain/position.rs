//! Open position — at most one per symbol at any simulated time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::level::LevelKind;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

/// An open position created by an entry signal against a level.
///
/// Entries and exits are atomic at the evaluated price; there is no
/// partial-fill state. Closing a position produces a `Trade`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub direction: Direction,
    pub entry_ts: NaiveDateTime,
    pub entry_price: f64,
    /// Row index of the entry within the day's feature series.
    pub entry_index: usize,
    /// The level that originated the entry.
    pub level_price: f64,
    pub level_strength: f64,
    pub level_kind: LevelKind,
    /// Bars held so far, incremented once per evaluated row after entry.
    pub bars_held: usize,
}

impl Position {
    /// Favorable-is-positive PnL in ticks at the given price.
    pub fn pnl_ticks(&self, price: f64) -> f64 {
        match self.direction {
            Direction::Long => price - self.entry_price,
            Direction::Short => self.entry_price - price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn open(direction: Direction) -> Position {
        Position {
            symbol: "7203".into(),
            direction,
            entry_ts: NaiveDate::from_ymd_opt(2026, 1, 20)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            entry_price: 1000.0,
            entry_index: 12,
            level_price: 998.0,
            level_strength: 0.7,
            level_kind: LevelKind::PivotSr,
            bars_held: 0,
        }
    }

    #[test]
    fn long_pnl_is_price_minus_entry() {
        let pos = open(Direction::Long);
        assert_eq!(pos.pnl_ticks(1011.0), 11.0);
        assert_eq!(pos.pnl_ticks(995.0), -5.0);
    }

    #[test]
    fn short_pnl_is_entry_minus_price() {
        let pos = open(Direction::Short);
        assert_eq!(pos.pnl_ticks(990.0), 10.0);
        assert_eq!(pos.pnl_ticks(1004.0), -4.0);
    }
}
