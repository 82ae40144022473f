//! LOB feature engine — derives per-snapshot microstructure features.
//!
//! One invocation per instrument per day, pure. Input must be ascending
//! by timestamp (the data layer guarantees this); unusable snapshots
//! (missing a best quote) are skipped defensively even though the data
//! layer already drops them.

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureRow, OrderBookSnapshot};

/// Tunables for the feature engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Rolling window (in snapshots) for the order-flow-imbalance sum.
    pub ofi_window: usize,
    /// Book depth (ranks) for the depth-imbalance sum.
    pub depth: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            ofi_window: 20,
            depth: 5,
        }
    }
}

/// Compute the feature series for one instrument's snapshot stream.
///
/// Formulas, best quotes indexed from rank 1:
/// - `spread = ask1 − bid1`, `mid = (ask1 + bid1) / 2`
/// - `quantity_imbalance = (bid1_qty − ask1_qty) / (bid1_qty + ask1_qty)`
/// - `microprice = (ask1·bid1_qty + bid1·ask1_qty) / (bid1_qty + ask1_qty)`,
///   `micro_bias = microprice − mid`
/// - OFI per side: full best-quote quantity when the price improved,
///   quantity delta when unchanged, zero when it worsened; instantaneous
///   value is bid contribution minus ask contribution, summed over the
///   trailing window (leading partial windows included)
/// - `depth_imbalance = Σ bid_qty − Σ ask_qty` over present ranks up to
///   the configured depth
///
/// Zero-denominator features come back as `None`, never 0.0.
pub fn compute_features(snapshots: &[OrderBookSnapshot], cfg: &FeatureConfig) -> Vec<FeatureRow> {
    debug_assert!(
        snapshots.windows(2).all(|w| w[0].ts <= w[1].ts),
        "snapshots must be ascending by timestamp"
    );

    let usable: Vec<&OrderBookSnapshot> = snapshots.iter().filter(|s| s.is_usable()).collect();
    let mut rows = Vec::with_capacity(usable.len());
    let mut ofi_inst = Vec::with_capacity(usable.len());
    let mut ofi_window_sum = 0.0;

    for (i, snap) in usable.iter().enumerate() {
        let bid = snap.best_bid().expect("usable snapshot has a best bid");
        let ask = snap.best_ask().expect("usable snapshot has a best ask");

        let spread = ask.price - bid.price;
        let mid = (ask.price + bid.price) / 2.0;

        let denom = bid.qty + ask.qty;
        let (quantity_imbalance, microprice, micro_bias) = if denom == 0.0 {
            (None, None, None)
        } else {
            let micro = (ask.price * bid.qty + bid.price * ask.qty) / denom;
            (
                Some((bid.qty - ask.qty) / denom),
                Some(micro),
                Some(micro - mid),
            )
        };

        let inst = match i.checked_sub(1).map(|p| usable[p]) {
            None => 0.0,
            Some(prev) => {
                let prev_bid = prev.best_bid().expect("usable snapshot has a best bid");
                let prev_ask = prev.best_ask().expect("usable snapshot has a best ask");
                let bid_side = if bid.price > prev_bid.price {
                    bid.qty
                } else if bid.price == prev_bid.price {
                    bid.qty - prev_bid.qty
                } else {
                    0.0
                };
                let ask_side = if ask.price < prev_ask.price {
                    ask.qty
                } else if ask.price == prev_ask.price {
                    ask.qty - prev_ask.qty
                } else {
                    0.0
                };
                bid_side - ask_side
            }
        };
        ofi_inst.push(inst);
        ofi_window_sum += inst;
        if i >= cfg.ofi_window {
            ofi_window_sum -= ofi_inst[i - cfg.ofi_window];
        }

        let depth_imbalance = match (snap.bid_depth(cfg.depth), snap.ask_depth(cfg.depth)) {
            (Some(b), Some(a)) => Some(b - a),
            _ => None,
        };

        rows.push(FeatureRow {
            ts: snap.ts,
            symbol: snap.symbol.clone(),
            spread,
            mid,
            quantity_imbalance,
            microprice,
            micro_bias,
            ofi: ofi_window_sum,
            depth_imbalance,
        });
    }

    rows
}
