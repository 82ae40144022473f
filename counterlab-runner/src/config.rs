//! Serializable backtest configuration (TOML).
//!
//! Captures everything needed to reproduce a run: date range and data
//! directories, universe and exclusions, default strategy parameters plus
//! per-symbol overrides, level/feature/session settings. `run_id()` is a
//! content hash, so two identical configs share an identity.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use counterlab_core::engine::SimulationSettings;
use counterlab_core::features::FeatureConfig;
use counterlab_core::levels::LevelConfig;
use counterlab_core::strategy::{SessionConfig, StrategyParams};

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a configuration. All fatal at
/// startup, before any day is simulated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Date range, data locations, and run-wide switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    /// First simulated day (inclusive).
    pub start: NaiveDate,
    /// Last simulated day (inclusive).
    pub end: NaiveDate,
    pub candle_dir: PathBuf,
    pub book_dir: PathBuf,
    /// Candle lookback window in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Keep open positions across day boundaries.
    #[serde(default)]
    pub carry_positions: bool,
    /// Non-weekend days the market is closed.
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

fn default_lookback_days() -> u32 {
    5
}

/// Instrument selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseSection {
    /// Instruments to simulate; empty means every instrument found.
    pub symbols: Vec<String>,
    /// Instruments skipped entirely.
    pub excluded: Vec<String>,
}

/// Complete run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub universe: UniverseSection,
    #[serde(default)]
    pub strategy: StrategyParams,
    /// Per-symbol parameter overrides, keyed by symbol.
    #[serde(default)]
    pub overrides: HashMap<String, StrategyParams>,
    #[serde(default)]
    pub levels: LevelConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
}

impl RunConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: RunConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Startup validation — every violation here aborts before day one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.start > self.backtest.end {
            return Err(ConfigError::Invalid(format!(
                "start {} is after end {}",
                self.backtest.start, self.backtest.end
            )));
        }
        if !self.universe.symbols.is_empty()
            && self
                .universe
                .symbols
                .iter()
                .all(|s| self.universe.excluded.contains(s))
        {
            return Err(ConfigError::Invalid(
                "every universe symbol is excluded".into(),
            ));
        }
        for (label, params) in std::iter::once(("default", &self.strategy))
            .chain(self.overrides.iter().map(|(k, v)| (k.as_str(), v)))
        {
            validate_params(label, params)?;
        }
        if self.features.ofi_window == 0 {
            return Err(ConfigError::Invalid("ofi_window must be > 0".into()));
        }
        if self.features.depth == 0 {
            return Err(ConfigError::Invalid("depth must be > 0".into()));
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Enables artifact correlation: two runs with identical configs get
    /// the same RunId.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Lower into the engine's settings value.
    pub fn to_settings(&self) -> SimulationSettings {
        SimulationSettings {
            start: self.backtest.start,
            end: self.backtest.end,
            universe: self.universe.symbols.clone(),
            excluded: self.universe.excluded.clone(),
            holidays: self.backtest.holidays.clone(),
            lookback_days: self.backtest.lookback_days,
            carry_positions: self.backtest.carry_positions,
            default_params: self.strategy.clone(),
            param_overrides: self.overrides.clone(),
            levels: self.levels.clone(),
            features: self.features.clone(),
            sessions: self.sessions.clone(),
        }
    }

    /// Strategy parameters for one instrument: override or default.
    pub fn params_for(&self, symbol: &str) -> &StrategyParams {
        self.overrides.get(symbol).unwrap_or(&self.strategy)
    }
}

fn validate_params(label: &str, params: &StrategyParams) -> Result<(), ConfigError> {
    if params.k_tick <= 0.0 || params.x_tick <= 0.0 || params.y_tick <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "tick parameters for '{label}' must be positive"
        )));
    }
    if params.max_hold_bars == 0 {
        return Err(ConfigError::Invalid(format!(
            "max_hold_bars for '{label}' must be > 0"
        )));
    }
    if !(0.0..=1.0).contains(&params.strength_threshold) {
        return Err(ConfigError::Invalid(format!(
            "strength_threshold for '{label}' must be in [0, 1]"
        )));
    }
    Ok(())
}
