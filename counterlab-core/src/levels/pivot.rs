//! Pivot S/R levels — classic pivot-point formula from the prior period.
//!
//! P = (H + L + C) / 3, R1 = 2P − L, S1 = 2P − H,
//! R2 = P + (H − L), S2 = P − (H − L),
//! where H/L/C are the prior period's high, low, and last close.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Level, LevelKind, LevelMeta};

use super::DailyBar;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    pub enable: bool,
    pub strength: f64,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            enable: true,
            strength: 0.7,
        }
    }
}

/// Emit S2, S1, P, R1, R2 from the most recent completed day in the
/// window. Empty when no daily bar is available.
pub fn generate(
    symbol: &str,
    days: &[DailyBar],
    cutoff: NaiveDate,
    cfg: &PivotConfig,
) -> Vec<Level> {
    let Some(prior) = days.last() else {
        return Vec::new();
    };

    let p = (prior.high + prior.low + prior.close) / 3.0;
    let range = prior.high - prior.low;
    let prices = [
        p - range,            // S2
        2.0 * p - prior.high, // S1
        p,                    // pivot
        2.0 * p - prior.low,  // R1
        p + range,            // R2
    ];

    prices
        .into_iter()
        .map(|price| Level {
            symbol: symbol.to_string(),
            kind: LevelKind::PivotSr,
            price,
            strength: cfg.strength,
            anchor_ts: Some(prior.last_ts),
            generated_for: cutoff,
            meta: LevelMeta {
                merged_count: 1,
                ..LevelMeta::default()
            },
        })
        .collect()
}
