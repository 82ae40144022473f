//! CounterLab Core — mean-reversion backtesting engine.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (candles, order-book snapshots, feature rows, levels,
//!   positions, trades)
//! - Leak-safe windowed data access over per-day CSV directories
//! - LOB micro-feature computation (spread, mid, imbalances, microprice,
//!   order-flow imbalance)
//! - Five togglable S/R level generation methods with merging and
//!   quality filtering
//! - The per-symbol Flat → Long|Short → Flat trade state machine
//! - The business-day simulation driver with deterministic per-instrument
//!   parallelism

pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod features;
pub mod levels;
pub mod strategy;

pub use error::DataError;
