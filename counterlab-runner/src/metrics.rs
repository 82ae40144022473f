//! Performance summaries — pure functions over the trade list.
//!
//! No dependency on the runner or engine internals: trades in, numbers
//! out. Sub-aggregates slice the same computation by symbol and by exit
//! reason.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use counterlab_core::domain::Trade;

/// Aggregate statistics for a set of trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub max_win: f64,
    pub max_loss: f64,
    pub profit_factor: f64,
    pub avg_hold_bars: f64,
}

impl Summary {
    /// Compute the summary for a slice of trades. An empty slice yields
    /// the all-zero summary rather than NaNs.
    pub fn compute(trades: &[Trade]) -> Self {
        if trades.is_empty() {
            return Self::empty();
        }

        let total = trades.len();
        let wins = trades.iter().filter(|t| t.pnl_ticks > 0.0).count();
        let losses = trades.iter().filter(|t| t.pnl_ticks < 0.0).count();
        let total_pnl: f64 = trades.iter().map(|t| t.pnl_ticks).sum();
        let max_win = trades.iter().map(|t| t.pnl_ticks).fold(0.0, f64::max);
        let max_loss = trades.iter().map(|t| t.pnl_ticks).fold(0.0, f64::min);
        let hold_sum: usize = trades.iter().map(|t| t.bars_held).sum();

        Self {
            total_trades: total,
            wins,
            losses,
            win_rate: wins as f64 / total as f64,
            total_pnl,
            avg_pnl: total_pnl / total as f64,
            max_win,
            max_loss,
            profit_factor: profit_factor(trades),
            avg_hold_bars: hold_sum as f64 / total as f64,
        }
    }

    pub fn empty() -> Self {
        Self {
            total_trades: 0,
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            total_pnl: 0.0,
            avg_pnl: 0.0,
            max_win: 0.0,
            max_loss: 0.0,
            profit_factor: 0.0,
            avg_hold_bars: 0.0,
        }
    }
}

/// Profit factor: gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.pnl_ticks > 0.0)
        .map(|t| t.pnl_ticks)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl_ticks < 0.0)
        .map(|t| t.pnl_ticks.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Overall summary plus per-symbol and per-exit-reason slices.
///
/// BTreeMaps keep the report ordering stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub overall: Summary,
    pub by_symbol: BTreeMap<String, Summary>,
    pub by_exit_reason: BTreeMap<String, Summary>,
}

impl SummaryReport {
    pub fn compute(trades: &[Trade]) -> Self {
        let mut by_symbol_trades: BTreeMap<String, Vec<Trade>> = BTreeMap::new();
        let mut by_reason_trades: BTreeMap<String, Vec<Trade>> = BTreeMap::new();
        for trade in trades {
            by_symbol_trades
                .entry(trade.symbol.clone())
                .or_default()
                .push(trade.clone());
            by_reason_trades
                .entry(trade.exit_reason.as_str().to_string())
                .or_default()
                .push(trade.clone());
        }

        Self {
            overall: Summary::compute(trades),
            by_symbol: by_symbol_trades
                .into_iter()
                .map(|(k, v)| (k, Summary::compute(&v)))
                .collect(),
            by_exit_reason: by_reason_trades
                .into_iter()
                .map(|(k, v)| (k, Summary::compute(&v)))
                .collect(),
        }
    }
}
