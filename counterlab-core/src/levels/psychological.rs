//! Psychological levels — round-number prices near the current price.
//!
//! The rounding increment is chosen from a price-band table (cheap stocks
//! react to finer round numbers than expensive ones), falling back to a
//! fixed increment when no band matches. Levels are emitted at every
//! multiple of the increment within ±`range_pct` of the last close.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Candle, Level, LevelKind, LevelMeta};

/// Price band → rounding increment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
    pub round_to: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PsychologicalConfig {
    pub enable: bool,
    pub strength: f64,
    /// Fallback increment when no band matches.
    pub round_to: f64,
    /// Per-price-band increments, checked in order.
    pub bands: Vec<PriceBand>,
    /// Half-width of the emission range around the last close, percent.
    pub range_pct: f64,
}

impl Default for PsychologicalConfig {
    fn default() -> Self {
        Self {
            enable: true,
            strength: 0.4,
            round_to: 100.0,
            bands: vec![
                PriceBand {
                    min: 0.0,
                    max: 1000.0,
                    round_to: 50.0,
                },
                PriceBand {
                    min: 1000.0,
                    max: 10_000.0,
                    round_to: 100.0,
                },
                // f64::MAX rather than infinity: the band table must
                // survive a JSON round trip, and JSON has no Inf.
                PriceBand {
                    min: 10_000.0,
                    max: f64::MAX,
                    round_to: 1000.0,
                },
            ],
            range_pct: 10.0,
        }
    }
}

impl PsychologicalConfig {
    fn increment_for(&self, price: f64) -> f64 {
        self.bands
            .iter()
            .find(|b| b.min <= price && price < b.max)
            .map(|b| b.round_to)
            .unwrap_or(self.round_to)
    }
}

pub fn generate(
    symbol: &str,
    candles: &[Candle],
    cutoff: NaiveDate,
    cfg: &PsychologicalConfig,
) -> Vec<Level> {
    let Some(last) = candles.last() else {
        return Vec::new();
    };
    let reference = last.close;
    let increment = cfg.increment_for(reference);
    if increment <= 0.0 || reference <= 0.0 {
        return Vec::new();
    }

    let lo = reference * (1.0 - cfg.range_pct / 100.0);
    let hi = reference * (1.0 + cfg.range_pct / 100.0);

    // Step by integer multiples so repeated addition cannot drift.
    let first = (lo / increment).ceil() as i64;
    let last_multiple = (hi / increment).floor() as i64;

    (first..=last_multiple)
        .map(|k| Level {
            symbol: symbol.to_string(),
            kind: LevelKind::Psychological,
            price: k as f64 * increment,
            strength: cfg.strength,
            anchor_ts: None,
            generated_for: cutoff,
            meta: LevelMeta {
                round_to: Some(increment),
                merged_count: 1,
                ..LevelMeta::default()
            },
        })
        .collect()
}
