//! Counter-trade strategy rules — entry selection against levels and
//! fixed-order exit evaluation.
//!
//! Entries fire when the mid price sits inside a level's reaction band
//! and at least one defined microstructure signal points in the trade
//! direction (mean reversion: upward pressure at a level reads it as
//! support, downward as resistance). Exits check price targets before
//! time and signal conditions, so the reported exit reason is stable when
//! several conditions trigger on the same bar.

pub mod session;

pub use session::{SessionConfig, SessionWindow};

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, ExitReason, FeatureRow, Level, Position};

/// Per-symbol strategy tunables. All price distances are in ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Half-width of the reaction band around a level.
    pub k_tick: f64,
    /// Profit target distance from entry.
    pub x_tick: f64,
    /// Stop-loss distance from entry.
    pub y_tick: f64,
    /// Maximum bars a position may be held.
    pub max_hold_bars: usize,
    /// Levels weaker than this never qualify for entry.
    pub strength_threshold: f64,
    /// Defined signals that must oppose the position for a reversal exit.
    pub reversal_min_signals: usize,
    /// Evaluate the reversal exit before the hold-time exit.
    pub reversal_before_hold: bool,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            k_tick: 5.0,
            x_tick: 10.0,
            y_tick: 5.0,
            max_hold_bars: 60,
            strength_threshold: 0.5,
            reversal_min_signals: 3,
            reversal_before_hold: false,
        }
    }
}

/// A level/direction pair that qualified for entry on the current row.
#[derive(Debug, Clone)]
pub struct EntrySignal<'a> {
    pub direction: Direction,
    pub level: &'a Level,
}

/// Pick the entry to take on this row, if any.
///
/// Qualification: level strength at or above the threshold, mid inside
/// the reaction band, and at least one defined signal agreeing with the
/// direction. Tie-break among qualifiers: highest strength, then nearest
/// level by absolute price distance, then Long before Short, then lowest
/// level price — a total order, so selection is deterministic.
pub fn select_entry<'a>(
    row: &FeatureRow,
    levels: &'a [Level],
    params: &StrategyParams,
) -> Option<EntrySignal<'a>> {
    let upward = row.signals_pointing(true) >= 1;
    let downward = row.signals_pointing(false) >= 1;
    if !upward && !downward {
        return None;
    }

    let mut best: Option<(EntrySignal<'a>, f64)> = None;
    for level in levels {
        if level.strength < params.strength_threshold {
            continue;
        }
        let distance = (row.mid - level.price).abs();
        if distance > params.k_tick {
            continue;
        }
        for direction in [Direction::Long, Direction::Short] {
            let agrees = match direction {
                Direction::Long => upward,
                Direction::Short => downward,
            };
            if !agrees {
                continue;
            }
            let candidate = (EntrySignal { direction, level }, distance);
            best = Some(match best.take() {
                None => candidate,
                Some(current) => pick_better(current, candidate),
            });
        }
    }
    best.map(|(signal, _)| signal)
}

fn pick_better<'a>(
    a: (EntrySignal<'a>, f64),
    b: (EntrySignal<'a>, f64),
) -> (EntrySignal<'a>, f64) {
    let strength = b.0.level.strength.partial_cmp(&a.0.level.strength);
    match strength {
        Some(std::cmp::Ordering::Greater) => return b,
        Some(std::cmp::Ordering::Less) => return a,
        _ => {}
    }
    if b.1 < a.1 {
        return b;
    }
    if b.1 > a.1 {
        return a;
    }
    // Long beats Short, then the lower price wins.
    match (a.0.direction, b.0.direction) {
        (Direction::Short, Direction::Long) => b,
        (Direction::Long, Direction::Short) => a,
        _ => {
            if b.0.level.price < a.0.level.price {
                b
            } else {
                a
            }
        }
    }
}

/// Evaluate the exit conditions for an open position on this row.
///
/// Price exits come first — profit target, then stop loss — so they win
/// over time and signal exits when several trigger at once. The relative
/// order of hold-time and reversal exits follows
/// `params.reversal_before_hold`.
pub fn select_exit(
    position: &Position,
    row: &FeatureRow,
    params: &StrategyParams,
) -> Option<ExitReason> {
    let pnl = position.pnl_ticks(row.mid);
    if pnl >= params.x_tick {
        return Some(ExitReason::ProfitTarget);
    }
    if pnl <= -params.y_tick {
        return Some(ExitReason::StopLoss);
    }

    let hold_hit = position.bars_held >= params.max_hold_bars;
    let against = match position.direction {
        Direction::Long => row.signals_pointing(false),
        Direction::Short => row.signals_pointing(true),
    };
    let reversal_hit = params.reversal_min_signals > 0 && against >= params.reversal_min_signals;

    let ordered = if params.reversal_before_hold {
        [
            (reversal_hit, ExitReason::ReversalSignal),
            (hold_hit, ExitReason::HoldTimeLimit),
        ]
    } else {
        [
            (hold_hit, ExitReason::HoldTimeLimit),
            (reversal_hit, ExitReason::ReversalSignal),
        ]
    };
    ordered.into_iter().find(|(hit, _)| *hit).map(|(_, r)| r)
}
