//! Simulation driver — business-day iteration and per-day orchestration.
//!
//! Per day: window candles to the previous business day (levels must come
//! strictly from prior data), load the day's order book, generate levels,
//! compute features, then simulate every instrument independently.
//! Instruments parallelize on the rayon pool; results are re-sorted
//! `(entry_ts, symbol)` after the merge so output is bit-identical to a
//! sequential run.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{business_days, prev_business_day, DataStore};
use crate::domain::{Candle, OrderBookSnapshot, Position};
use crate::error::DataError;
use crate::features::{compute_features, FeatureConfig};
use crate::levels::{self, LevelConfig};
use crate::strategy::{SessionConfig, StrategyParams};

use super::report::{DayReport, RunOutcome};
use super::simulator::simulate_symbol_day;

/// Everything the driver needs for a run. Immutable once constructed;
/// per-symbol parameters resolve through `params_for`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Instruments to simulate; empty means every instrument with
    /// order-book data on a given day.
    pub universe: Vec<String>,
    /// Instruments skipped entirely, every day.
    pub excluded: Vec<String>,
    pub holidays: Vec<NaiveDate>,
    /// Candle lookback window in days.
    pub lookback_days: u32,
    /// Keep open positions across day boundaries instead of flattening.
    pub carry_positions: bool,
    pub default_params: StrategyParams,
    pub param_overrides: HashMap<String, StrategyParams>,
    pub levels: LevelConfig,
    pub features: FeatureConfig,
    pub sessions: SessionConfig,
}

impl SimulationSettings {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            universe: Vec::new(),
            excluded: Vec::new(),
            holidays: Vec::new(),
            lookback_days: 5,
            carry_positions: false,
            default_params: StrategyParams::default(),
            param_overrides: HashMap::new(),
            levels: LevelConfig::default(),
            features: FeatureConfig::default(),
            sessions: SessionConfig::default(),
        }
    }

    /// Strategy parameters for one instrument: override or default.
    pub fn params_for(&self, symbol: &str) -> &StrategyParams {
        self.param_overrides.get(symbol).unwrap_or(&self.default_params)
    }

    fn is_excluded(&self, symbol: &str) -> bool {
        self.excluded.iter().any(|s| s == symbol)
    }
}

/// Run the simulation across the configured date range.
///
/// `DataError::Leak` aborts immediately; a day with no order-book
/// directory is recorded as skipped and the run continues.
pub fn run_simulation(
    store: &DataStore,
    settings: &SimulationSettings,
) -> Result<RunOutcome, DataError> {
    let mut outcome = RunOutcome::default();
    let mut carried: HashMap<String, Position> = HashMap::new();

    for day in business_days(settings.start, settings.end, &settings.holidays) {
        let report = simulate_day(store, settings, day, &mut carried, &mut outcome)?;
        outcome.days.push(report);
    }

    // Positions still carried after the final day end the run open; with
    // carry disabled the session close already flattened everything.
    Ok(outcome)
}

fn simulate_day(
    store: &DataStore,
    settings: &SimulationSettings,
    day: NaiveDate,
    carried: &mut HashMap<String, Position>,
    outcome: &mut RunOutcome,
) -> Result<DayReport, DataError> {
    let cutoff = prev_business_day(day, &settings.holidays);
    let candles = store.load_candles_until(cutoff, settings.lookback_days)?;

    let book = match store.load_book_for(day) {
        Ok(book) => book,
        Err(err) if err.is_recoverable() => {
            return Ok(DayReport::skipped_day(day));
        }
        Err(err) => return Err(err),
    };

    // Resolve the instrument list for the day.
    let mut symbols: Vec<String> = if settings.universe.is_empty() {
        book.by_symbol.keys().cloned().collect()
    } else {
        settings.universe.clone()
    };
    symbols.retain(|s| !settings.is_excluded(s));
    symbols.sort();
    symbols.dedup();

    let mut report = DayReport {
        date: day,
        simulated: Vec::new(),
        missing_data: Vec::new(),
        zero_trades: Vec::new(),
        zero_levels: Vec::new(),
        skipped: false,
        dropped_rows: candles.dropped_rows + book.dropped_rows,
        unusable_snapshots: book.unusable_snapshots,
        trade_count: 0,
        level_count: 0,
    };

    // Partition into simulatable instruments and missing-data skips,
    // pulling any carried position out of the map up front so the
    // parallel stage owns its inputs.
    let empty: Vec<Candle> = Vec::new();
    let mut jobs: Vec<(String, &[Candle], &[OrderBookSnapshot], Option<Position>)> = Vec::new();
    for symbol in symbols {
        match book.by_symbol.get(&symbol) {
            Some(snapshots) => {
                let symbol_candles = candles
                    .by_symbol
                    .get(&symbol)
                    .map(|c| c.as_slice())
                    .unwrap_or(&empty);
                let position = carried.remove(&symbol);
                jobs.push((symbol, symbol_candles, snapshots, position));
            }
            None => report.missing_data.push(symbol),
        }
    }

    let day_results: Vec<_> = jobs
        .into_par_iter()
        .map(|(symbol, symbol_candles, snapshots, position)| {
            let levels = levels::generate(&symbol, symbol_candles, cutoff, &settings.levels);
            let rows = compute_features(snapshots, &settings.features);
            let result = simulate_symbol_day(
                &rows,
                &levels,
                settings.params_for(&symbol),
                &settings.sessions,
                position,
                settings.carry_positions,
            );
            (symbol, levels, result)
        })
        .collect();

    let mut day_trades = Vec::new();
    for (symbol, levels, result) in day_results {
        report.simulated.push(symbol.clone());
        if result.trades.is_empty() {
            report.zero_trades.push(symbol.clone());
        }
        if levels.is_empty() {
            report.zero_levels.push(symbol.clone());
        }
        report.level_count += levels.len();
        outcome.levels.extend(levels);
        day_trades.extend(result.trades);
        if let Some(position) = result.open_position {
            carried.insert(symbol, position);
        }
    }

    // Deterministic merge order regardless of rayon scheduling.
    day_trades.sort_by(|a, b| a.entry_ts.cmp(&b.entry_ts).then_with(|| a.symbol.cmp(&b.symbol)));
    report.trade_count = day_trades.len();
    outcome.trades.extend(day_trades);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_for_prefers_override() {
        let mut settings = SimulationSettings::new(
            NaiveDate::from_ymd_opt(2026, 1, 19).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 23).unwrap(),
        );
        settings.param_overrides.insert(
            "7203".into(),
            StrategyParams {
                k_tick: 2.0,
                ..StrategyParams::default()
            },
        );
        assert_eq!(settings.params_for("7203").k_tick, 2.0);
        assert_eq!(
            settings.params_for("9984").k_tick,
            StrategyParams::default().k_tick
        );
    }

    #[test]
    fn exclusion_list_matches_exactly() {
        let mut settings = SimulationSettings::new(
            NaiveDate::from_ymd_opt(2026, 1, 19).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 23).unwrap(),
        );
        settings.excluded.push("9984".into());
        assert!(settings.is_excluded("9984"));
        assert!(!settings.is_excluded("998"));
    }
}
