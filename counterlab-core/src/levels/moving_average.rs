//! Moving-average levels — the current SMA of daily closes is itself a level.
//!
//! Unlike the horizontal methods, the anchor here is the live average: a
//! new cutoff date moves the level. Two independently configured periods
//! (conventionally 5 and 25 days) run as separate methods.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Level, LevelKind, LevelMeta};

use super::DailyBar;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaConfig {
    pub enable: bool,
    pub strength: f64,
    pub period: usize,
}

impl MaConfig {
    pub fn ma5() -> Self {
        Self {
            enable: true,
            strength: 0.5,
            period: 5,
        }
    }

    pub fn ma25() -> Self {
        Self {
            enable: true,
            strength: 0.5,
            period: 25,
        }
    }
}

/// Emit one level at the SMA of the last `period` daily closes.
/// Empty when fewer days are available than the period needs.
pub fn generate(
    symbol: &str,
    days: &[DailyBar],
    cutoff: NaiveDate,
    kind: LevelKind,
    cfg: &MaConfig,
) -> Vec<Level> {
    if cfg.period == 0 || days.len() < cfg.period {
        return Vec::new();
    }

    let window = &days[days.len() - cfg.period..];
    let ma = window.iter().map(|d| d.close).sum::<f64>() / cfg.period as f64;
    let anchor = window.last().expect("period >= 1").last_ts;

    vec![Level {
        symbol: symbol.to_string(),
        kind,
        price: ma,
        strength: cfg.strength,
        anchor_ts: Some(anchor),
        generated_for: cutoff,
        meta: LevelMeta {
            period: Some(cfg.period),
            merged_count: 1,
            ..LevelMeta::default()
        },
    }]
}
