//! Derived LOB feature row — one per usable order-book snapshot.
//!
//! Features whose denominator is zero are `None` ("undefined"), never a
//! fabricated 0.0 and never NaN: undefined propagates as "no signal" in
//! the strategy layer instead of pretending to be a neutral reading.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Per-snapshot microstructure features for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub ts: NaiveDateTime,
    pub symbol: String,

    /// ask1 - bid1. Always defined for a usable snapshot.
    pub spread: f64,
    /// (ask1 + bid1) / 2. Always defined for a usable snapshot.
    pub mid: f64,
    /// (bid1_qty - ask1_qty) / (bid1_qty + ask1_qty). None on zero depth.
    pub quantity_imbalance: Option<f64>,
    /// Quantity-weighted fair price between the best quotes. None on zero depth.
    pub microprice: Option<f64>,
    /// microprice - mid. None on zero depth.
    pub micro_bias: Option<f64>,
    /// Rolling order-flow imbalance over the configured window.
    pub ofi: f64,
    /// Σ bid_qty − Σ ask_qty over the configured depth, present ranks only.
    pub depth_imbalance: Option<f64>,
}

impl FeatureRow {
    /// The four directional signals the strategy consumes, in a fixed
    /// order: micro_bias, ofi, quantity_imbalance, depth_imbalance.
    ///
    /// Positive sign reads as upward pressure, negative as downward.
    pub fn signals(&self) -> [Option<f64>; 4] {
        [
            self.micro_bias,
            Some(self.ofi),
            self.quantity_imbalance,
            self.depth_imbalance,
        ]
    }

    /// Number of defined signals pointing in the given sign direction
    /// (`true` = upward / positive).
    pub fn signals_pointing(&self, upward: bool) -> usize {
        self.signals()
            .iter()
            .flatten()
            .filter(|&&v| if upward { v > 0.0 } else { v < 0.0 })
            .count()
    }
}
