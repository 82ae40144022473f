//! Per-symbol, per-day simulation — drives the Flat → Long|Short → Flat
//! state machine over one day's feature rows.
//!
//! The `Option<Position>` state makes the one-open-position invariant
//! structural: there is nowhere to put a second position.

use crate::domain::{ExitReason, FeatureRow, Level, Position, Trade};
use crate::strategy::{select_entry, select_exit, SessionConfig, StrategyParams};

/// Result of simulating one symbol across one day.
#[derive(Debug, Default)]
pub struct SymbolDayOutcome {
    pub trades: Vec<Trade>,
    /// Position still open at the end of the day (overnight carry only;
    /// None when carry is disabled, because the session close flattens).
    pub open_position: Option<Position>,
    pub rows_evaluated: usize,
}

/// Simulate one symbol's day.
///
/// Row loop, in order: session force-close, exit evaluation, then (on the
/// same row, unless a session boundary just closed us) entry evaluation.
/// `carried` seeds an overnight position whose `bars_held` keeps counting.
/// With `carry` false, any position still open at the end of the rows is
/// force-closed at the last mid and tagged `HoldTimeLimit`.
pub fn simulate_symbol_day(
    rows: &[FeatureRow],
    levels: &[Level],
    params: &StrategyParams,
    sessions: &SessionConfig,
    carried: Option<Position>,
    carry: bool,
) -> SymbolDayOutcome {
    let mut outcome = SymbolDayOutcome {
        rows_evaluated: rows.len(),
        ..SymbolDayOutcome::default()
    };
    let mut position = carried;
    let mut current_session: Option<usize> = None;

    for (index, row) in rows.iter().enumerate() {
        let session = sessions.session_index(row.ts);
        let session_changed = current_session.is_some() && session != current_session;
        current_session = session;

        let mut boundary_close = false;
        if let Some(mut pos) = position.take() {
            // Every evaluated row after the entry row counts toward the
            // hold limit (including rows carried in from a prior day).
            if !(pos.entry_index == index && pos.entry_ts == row.ts) {
                pos.bars_held += 1;
            }

            if session_changed || session.is_none() {
                outcome
                    .trades
                    .push(Trade::close(&pos, row.ts, row.mid, ExitReason::HoldTimeLimit));
                boundary_close = true;
            } else if let Some(reason) = select_exit(&pos, row, params) {
                outcome.trades.push(Trade::close(&pos, row.ts, row.mid, reason));
            } else {
                position = Some(pos);
            }
        }

        if position.is_none() && !boundary_close && session.is_some() && sessions.can_enter(row.ts)
        {
            if let Some(entry) = select_entry(row, levels, params) {
                position = Some(Position {
                    symbol: row.symbol.clone(),
                    direction: entry.direction,
                    entry_ts: row.ts,
                    entry_price: row.mid,
                    entry_index: index,
                    level_price: entry.level.price,
                    level_strength: entry.level.strength,
                    level_kind: entry.level.kind,
                    bars_held: 0,
                });
            }
        }
    }

    if let Some(pos) = position.take() {
        if carry {
            outcome.open_position = Some(pos);
        } else if let Some(last) = rows.last() {
            outcome
                .trades
                .push(Trade::close(&pos, last.ts, last.mid, ExitReason::HoldTimeLimit));
        } else {
            // Carried a position into a day with no rows: keep it open so
            // the driver can close or carry it on the next day with data.
            outcome.open_position = Some(pos);
        }
    }

    outcome
}
