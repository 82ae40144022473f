//! S/R level — a tagged price level generated for one cutoff date.
//!
//! Levels are immutable once generated; a new cutoff date regenerates the
//! full set. Adding a generation method means adding a `LevelKind`
//! variant and a table entry in the generator, not a trait object.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Closed set of level generation methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    PivotSr,
    Consolidation,
    Psychological,
    Ma5,
    Ma25,
}

impl LevelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelKind::PivotSr => "pivot_sr",
            LevelKind::Consolidation => "consolidation",
            LevelKind::Psychological => "psychological",
            LevelKind::Ma5 => "ma5",
            LevelKind::Ma25 => "ma25",
        }
    }

    /// All kinds, in generation order.
    pub fn all() -> [LevelKind; 5] {
        [
            LevelKind::PivotSr,
            LevelKind::Consolidation,
            LevelKind::Psychological,
            LevelKind::Ma5,
            LevelKind::Ma25,
        ]
    }
}

/// Generation metadata attached to a level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelMeta {
    /// Candle lookback the method consumed, in days.
    pub lookback_days: Option<u32>,
    /// Rounding increment (psychological levels).
    pub round_to: Option<f64>,
    /// Moving-average period (MA levels).
    pub period: Option<usize>,
    /// Consolidation zone bounds.
    pub zone_low: Option<f64>,
    /// Consolidation zone bounds.
    pub zone_high: Option<f64>,
    /// How many raw levels were merged into this one.
    pub merged_count: usize,
}

/// A support/resistance candidate price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub symbol: String,
    pub kind: LevelKind,
    pub price: f64,
    /// Configured per-kind strength in [0, 1], optionally touch-boosted.
    pub strength: f64,
    /// Bar that anchored the level (None for synthetic anchors like
    /// psychological round numbers).
    pub anchor_ts: Option<NaiveDateTime>,
    /// The cutoff date this level was generated for.
    pub generated_for: NaiveDate,
    pub meta: LevelMeta,
}

/// Merge levels lying within `tolerance_pct` percent of each other into a
/// single strength-weighted level. The merged strength is the sum of the
/// cluster's strengths capped at 1.0; `meta.merged_count` records the
/// cluster size. Input order does not matter; output is ascending by price.
pub fn merge_nearby_levels(mut levels: Vec<Level>, tolerance_pct: f64) -> Vec<Level> {
    if levels.is_empty() {
        return levels;
    }
    levels.sort_by(|a, b| {
        a.price
            .partial_cmp(&b.price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut merged = Vec::new();
    let mut cluster: Vec<Level> = vec![levels[0].clone()];

    for level in levels.into_iter().skip(1) {
        let last = cluster.last().expect("cluster is never empty");
        let diff_pct = (level.price - last.price).abs() / last.price * 100.0;
        if diff_pct <= tolerance_pct {
            cluster.push(level);
        } else {
            merged.push(merge_cluster(std::mem::replace(&mut cluster, vec![level])));
        }
    }
    merged.push(merge_cluster(cluster));
    merged
}

fn merge_cluster(cluster: Vec<Level>) -> Level {
    if cluster.len() == 1 {
        let mut level = cluster.into_iter().next().expect("len checked");
        level.meta.merged_count = level.meta.merged_count.max(1);
        return level;
    }

    let total_strength: f64 = cluster.iter().map(|l| l.strength).sum();
    let weighted_price = if total_strength > 0.0 {
        cluster.iter().map(|l| l.price * l.strength).sum::<f64>() / total_strength
    } else {
        cluster.iter().map(|l| l.price).sum::<f64>() / cluster.len() as f64
    };
    let count: usize = cluster.iter().map(|l| l.meta.merged_count.max(1)).sum();

    let mut out = cluster.into_iter().next().expect("len checked");
    out.price = weighted_price;
    out.strength = total_strength.min(1.0);
    out.meta.merged_count = count;
    out
}
