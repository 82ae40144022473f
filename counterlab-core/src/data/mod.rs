//! Data access: business-day calendar and the leak-safe windowed store.

pub mod calendar;
pub mod store;

pub use calendar::{business_days, is_business_day, prev_business_day};
pub use store::{DataStore, LoadedBook, LoadedCandles};
