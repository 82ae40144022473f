//! Order-book snapshot — ranked best-quote depth for one symbol at one instant.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One price/quantity rank on a side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub qty: f64,
}

/// Order-book snapshot: ranks 1..K per side, rank 1 being the best quote.
///
/// Trailing ranks may be missing (shallow books); a snapshot without a
/// best bid AND a best ask is unusable and never reaches the feature
/// engine — the data layer drops and counts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub ts: NaiveDateTime,
    pub symbol: String,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl OrderBookSnapshot {
    pub fn best_bid(&self) -> Option<BookLevel> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<BookLevel> {
        self.asks.first().copied()
    }

    /// Usable means both best quotes are present.
    pub fn is_usable(&self) -> bool {
        !self.bids.is_empty() && !self.asks.is_empty()
    }

    /// Sum of bid quantities over ranks 1..=depth, counting only ranks
    /// actually present. None when no bid rank exists.
    pub fn bid_depth(&self, depth: usize) -> Option<f64> {
        depth_sum(&self.bids, depth)
    }

    /// Sum of ask quantities over ranks 1..=depth, counting only ranks
    /// actually present. None when no ask rank exists.
    pub fn ask_depth(&self, depth: usize) -> Option<f64> {
        depth_sum(&self.asks, depth)
    }
}

fn depth_sum(side: &[BookLevel], depth: usize) -> Option<f64> {
    if side.is_empty() {
        return None;
    }
    Some(side.iter().take(depth).map(|l| l.qty).sum())
}
