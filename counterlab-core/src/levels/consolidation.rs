//! Consolidation levels — flat-zone detection over the candle window.
//!
//! A consolidation is a contiguous run of at least `min_bars` candles
//! whose total high−low range stays within `price_range_pct` percent of
//! the run's mean close. Each maximal run emits one level at the zone
//! midpoint, with the zone bounds recorded in the level metadata.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Candle, Level, LevelKind, LevelMeta};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    pub enable: bool,
    pub strength: f64,
    /// Minimum run length in bars.
    pub min_bars: usize,
    /// Maximum total range as a percentage of the run's mean close.
    pub price_range_pct: f64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            enable: true,
            strength: 0.6,
            min_bars: 10,
            price_range_pct: 0.5,
        }
    }
}

pub fn generate(
    symbol: &str,
    candles: &[Candle],
    cutoff: NaiveDate,
    cfg: &ConsolidationConfig,
) -> Vec<Level> {
    let mut levels = Vec::new();
    if cfg.min_bars == 0 || candles.len() < cfg.min_bars {
        return levels;
    }

    let mut start = 0;
    while start + cfg.min_bars <= candles.len() {
        // Grow the run from `start` as far as the range condition holds.
        let mut high = candles[start].high;
        let mut low = candles[start].low;
        let mut close_sum = candles[start].close;
        let mut end = start;

        while end + 1 < candles.len() {
            let next = &candles[end + 1];
            let high2 = high.max(next.high);
            let low2 = low.min(next.low);
            let close_sum2 = close_sum + next.close;
            let mean = close_sum2 / (end + 2 - start) as f64;
            if mean <= 0.0 || (high2 - low2) / mean * 100.0 > cfg.price_range_pct {
                break;
            }
            high = high2;
            low = low2;
            close_sum = close_sum2;
            end += 1;
        }

        let run_len = end - start + 1;
        if run_len >= cfg.min_bars {
            levels.push(Level {
                symbol: symbol.to_string(),
                kind: LevelKind::Consolidation,
                price: (high + low) / 2.0,
                strength: cfg.strength,
                anchor_ts: Some(candles[end].ts),
                generated_for: cutoff,
                meta: LevelMeta {
                    zone_low: Some(low),
                    zone_high: Some(high),
                    merged_count: 1,
                    ..LevelMeta::default()
                },
            });
            start = end + 1;
        } else {
            start += 1;
        }
    }

    levels
}
