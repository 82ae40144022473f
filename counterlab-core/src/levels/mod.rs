//! S/R level generation — five independently togglable methods plus
//! merging, optional touch boosting, and quality filtering.
//!
//! Generation is pure and re-runs per cutoff date: identical candles and
//! config always produce an identical level set. Disabled methods are
//! never invoked — filtering happens before generation, not by zeroing
//! strengths afterwards.

pub mod consolidation;
pub mod moving_average;
pub mod pivot;
pub mod psychological;

pub use consolidation::ConsolidationConfig;
pub use moving_average::MaConfig;
pub use pivot::PivotConfig;
pub use psychological::{PriceBand, PsychologicalConfig};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{merge_nearby_levels, Candle, Level, LevelKind};

/// One calendar day aggregated from the candle series (identity mapping
/// when the series is already daily).
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub last_ts: NaiveDateTime,
}

/// Collapse an ascending candle series into one bar per calendar day.
pub fn daily_bars(candles: &[Candle]) -> Vec<DailyBar> {
    let mut days: Vec<DailyBar> = Vec::new();
    for candle in candles {
        let date = candle.ts.date();
        match days.last_mut() {
            Some(day) if day.date == date => {
                day.high = day.high.max(candle.high);
                day.low = day.low.min(candle.low);
                day.close = candle.close;
                day.last_ts = candle.ts;
            }
            _ => days.push(DailyBar {
                date,
                high: candle.high,
                low: candle.low,
                close: candle.close,
                last_ts: candle.ts,
            }),
        }
    }
    days
}

/// Recency-weighted touch-count boosting.
///
/// When enabled, each candle whose range comes within `tolerance` of a
/// level counts as a touch weighted `decay^days_ago`, so yesterday's
/// touches outweigh the day before's. The boosted strength is clamped
/// to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchBoostConfig {
    pub enable: bool,
    pub tolerance: f64,
    pub decay: f64,
    pub per_touch_weight: f64,
}

impl Default for TouchBoostConfig {
    fn default() -> Self {
        Self {
            enable: false,
            tolerance: 1.0,
            decay: 0.5,
            per_touch_weight: 0.05,
        }
    }
}

/// Post-generation quality filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Levels weaker than this are discarded.
    pub min_strength: f64,
    /// Keep at most this many levels per symbol (strongest first).
    pub max_levels: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_strength: 0.0,
            max_levels: 20,
        }
    }
}

/// Full level-generation configuration: per-method settings plus the
/// shared merge/boost/filter stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub pivot: PivotConfig,
    pub consolidation: ConsolidationConfig,
    pub psychological: PsychologicalConfig,
    pub ma5: MaConfig,
    pub ma25: MaConfig,
    /// Levels closer than this (percent) merge into one.
    pub merge_tolerance_pct: f64,
    pub touch_boost: TouchBoostConfig,
    pub quality: QualityConfig,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            pivot: PivotConfig::default(),
            consolidation: ConsolidationConfig::default(),
            psychological: PsychologicalConfig::default(),
            ma5: MaConfig::ma5(),
            ma25: MaConfig::ma25(),
            merge_tolerance_pct: 0.5,
            touch_boost: TouchBoostConfig::default(),
            quality: QualityConfig::default(),
        }
    }
}

impl LevelConfig {
    /// A config with every method switched off.
    pub fn all_disabled() -> Self {
        let mut cfg = Self::default();
        cfg.pivot.enable = false;
        cfg.consolidation.enable = false;
        cfg.psychological.enable = false;
        cfg.ma5.enable = false;
        cfg.ma25.enable = false;
        cfg
    }
}

/// Generate the full level set for one symbol at one cutoff date.
pub fn generate(
    symbol: &str,
    candles: &[Candle],
    cutoff: NaiveDate,
    cfg: &LevelConfig,
) -> Vec<Level> {
    let days = daily_bars(candles);
    let mut levels = Vec::new();

    if cfg.pivot.enable {
        levels.extend(pivot::generate(symbol, &days, cutoff, &cfg.pivot));
    }
    if cfg.consolidation.enable {
        levels.extend(consolidation::generate(
            symbol,
            candles,
            cutoff,
            &cfg.consolidation,
        ));
    }
    if cfg.psychological.enable {
        levels.extend(psychological::generate(
            symbol,
            candles,
            cutoff,
            &cfg.psychological,
        ));
    }
    if cfg.ma5.enable {
        levels.extend(moving_average::generate(
            symbol,
            &days,
            cutoff,
            LevelKind::Ma5,
            &cfg.ma5,
        ));
    }
    if cfg.ma25.enable {
        levels.extend(moving_average::generate(
            symbol,
            &days,
            cutoff,
            LevelKind::Ma25,
            &cfg.ma25,
        ));
    }

    if cfg.touch_boost.enable {
        for level in &mut levels {
            level.strength = boosted_strength(level.strength, level.price, candles, cutoff, &cfg.touch_boost);
        }
    }

    let mut levels = merge_nearby_levels(levels, cfg.merge_tolerance_pct);

    levels.retain(|l| l.strength >= cfg.quality.min_strength);
    levels.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal))
    });
    levels.truncate(cfg.quality.max_levels);
    levels.sort_by(|a, b| {
        a.price
            .partial_cmp(&b.price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    levels
}

fn boosted_strength(
    base: f64,
    price: f64,
    candles: &[Candle],
    cutoff: NaiveDate,
    cfg: &TouchBoostConfig,
) -> f64 {
    let mut weighted = 0.0;
    for candle in candles {
        let touches = candle.low <= price + cfg.tolerance && candle.high >= price - cfg.tolerance;
        if touches {
            let days_ago = (cutoff - candle.ts.date()).num_days().max(0) as i32;
            weighted += cfg.decay.powi(days_ago);
        }
    }
    (base + cfg.per_touch_weight * weighted).min(1.0)
}
