//! Backtest runner — wires configuration, data store, driver, and metrics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use counterlab_core::data::DataStore;
use counterlab_core::engine::{run_simulation, RunOutcome};
use counterlab_core::error::DataError;

use crate::config::{ConfigError, RunConfig, RunId};
use crate::metrics::SummaryReport;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    pub summary: SummaryReport,
    pub outcome: RunOutcome,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a backtest from a validated configuration.
///
/// Leak violations and startup validation failures abort; days or
/// instruments without data are skipped inside the driver and surface in
/// the day reports.
pub fn run_backtest(config: &RunConfig) -> Result<BacktestReport, RunError> {
    config.validate()?;
    let store = DataStore::new(
        config.backtest.candle_dir.clone(),
        config.backtest.book_dir.clone(),
    )?;
    let settings = config.to_settings();
    let outcome = run_simulation(&store, &settings)?;
    Ok(build_report(config, outcome))
}

/// Assemble the report from a finished simulation. Split out so tests
/// and alternative front-ends can reuse the shaping logic.
pub fn build_report(config: &RunConfig, outcome: RunOutcome) -> BacktestReport {
    BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        start: config.backtest.start,
        end: config.backtest.end,
        summary: SummaryReport::compute(&outcome.trades),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BacktestSection, UniverseSection};
    use chrono::NaiveDate;
    use counterlab_core::engine::DayReport;

    fn config_at(root: &std::path::Path) -> RunConfig {
        RunConfig {
            backtest: BacktestSection {
                start: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
                candle_dir: root.join("candles"),
                book_dir: root.join("book"),
                lookback_days: 5,
                carry_positions: false,
                holidays: Vec::new(),
            },
            universe: UniverseSection::default(),
            strategy: Default::default(),
            overrides: Default::default(),
            levels: Default::default(),
            features: Default::default(),
            sessions: Default::default(),
        }
    }

    #[test]
    fn missing_data_directories_fail() {
        let tmp = tempfile::tempdir().unwrap();
        let err = run_backtest(&config_at(tmp.path())).unwrap_err();
        assert!(matches!(err, RunError::Data(DataError::NotFound { .. })));
    }

    #[test]
    fn empty_outcome_builds_a_zeroed_report() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_at(tmp.path());
        let outcome = RunOutcome {
            trades: Vec::new(),
            levels: Vec::new(),
            days: vec![DayReport::skipped_day(config.backtest.start)],
        };
        let report = build_report(&config, outcome);
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.summary.overall.total_trades, 0);
        assert_eq!(report.run_id, config.run_id());
        assert_eq!(report.outcome.days.len(), 1);
    }
}
