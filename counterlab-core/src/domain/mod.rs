//! Domain types: candles, order-book snapshots, feature rows, levels,
//! positions, and trades.

pub mod candle;
pub mod feature;
pub mod level;
pub mod position;
pub mod snapshot;
pub mod trade;

pub use candle::Candle;
pub use feature::FeatureRow;
pub use level::{merge_nearby_levels, Level, LevelKind, LevelMeta};
pub use position::{Direction, Position};
pub use snapshot::{BookLevel, OrderBookSnapshot};
pub use trade::{ExitReason, Trade};
