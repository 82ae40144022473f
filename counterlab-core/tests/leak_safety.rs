//! Leak-safety tests for windowed data access.
//!
//! Invariant: no candle row returned by `load_candles_until(d, L)` may be
//! dated after `d`, and every order-book row returned by
//! `load_book_for(d)` must be dated exactly `d`. Planted future rows must
//! abort with `DataError::Leak`, never load.

use chrono::{Duration, NaiveDate};
use counterlab_core::data::DataStore;
use counterlab_core::error::DataError;
use proptest::prelude::*;
use std::path::Path;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

fn write_candle_day(root: &Path, date: NaiveDate, symbol: &str, close: f64) {
    let dir = root.join("candles").join(date.format("%Y%m%d").to_string());
    std::fs::create_dir_all(&dir).unwrap();
    let content = format!(
        "ts,open,high,low,close,volume\n{} 09:03:00,{close},{},{},{close},1000\n",
        date.format("%Y-%m-%d"),
        close + 2.0,
        close - 2.0,
    );
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

fn write_book_day(root: &Path, date: NaiveDate, symbol: &str, row_date: NaiveDate) {
    let dir = root.join("book").join(date.format("%Y%m%d").to_string());
    std::fs::create_dir_all(&dir).unwrap();
    let content = format!(
        "ts,bid_px_1,bid_qty_1,ask_px_1,ask_qty_1\n{} 09:30:00,999.5,100,1000.5,100\n",
        row_date.format("%Y-%m-%d"),
    );
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

fn store(root: &Path) -> DataStore {
    std::fs::create_dir_all(root.join("candles")).unwrap();
    std::fs::create_dir_all(root.join("book")).unwrap();
    DataStore::new(root.join("candles"), root.join("book")).unwrap()
}

#[test]
fn candle_rows_never_exceed_cutoff() {
    let tmp = tempfile::tempdir().unwrap();
    for offset in 0..10 {
        write_candle_day(tmp.path(), base_date() + Duration::days(offset), "7203", 1000.0);
    }
    let store = store(tmp.path());

    for cutoff_offset in 0..10 {
        let cutoff = base_date() + Duration::days(cutoff_offset);
        let loaded = store.load_candles_until(cutoff, 30).unwrap();
        for series in loaded.by_symbol.values() {
            assert!(series.iter().all(|c| c.ts.date() <= cutoff));
        }
    }
}

#[test]
fn book_rows_match_requested_date_exactly() {
    let tmp = tempfile::tempdir().unwrap();
    let day = base_date() + Duration::days(1);
    write_book_day(tmp.path(), day, "7203", day);
    let store = store(tmp.path());

    let loaded = store.load_book_for(day).unwrap();
    for series in loaded.by_symbol.values() {
        assert!(series.iter().all(|s| s.ts.date() == day));
    }
}

#[test]
fn planted_future_candle_aborts_with_leak() {
    let tmp = tempfile::tempdir().unwrap();
    let cutoff = base_date() + Duration::days(3);
    write_candle_day(tmp.path(), cutoff, "7203", 1000.0);
    // Mislabeled directory: dated inside the window, rows from the future.
    let dir = tmp
        .path()
        .join("candles")
        .join(cutoff.format("%Y%m%d").to_string());
    let future = cutoff + Duration::days(2);
    std::fs::write(
        dir.join("9984.csv"),
        format!(
            "ts,open,high,low,close,volume\n{} 09:03:00,500,502,498,500,100\n",
            future.format("%Y-%m-%d")
        ),
    )
    .unwrap();

    let store = store(tmp.path());
    let err = store.load_candles_until(cutoff, 30).unwrap_err();
    assert!(matches!(err, DataError::Leak { .. }));
    assert!(!err.is_recoverable());
}

#[test]
fn planted_spillover_book_row_aborts_with_leak() {
    let tmp = tempfile::tempdir().unwrap();
    let day = base_date() + Duration::days(1);
    write_book_day(tmp.path(), day, "7203", day + Duration::days(1));

    let store = store(tmp.path());
    let err = store.load_book_for(day).unwrap_err();
    assert!(matches!(err, DataError::Leak { .. }));
}

#[test]
fn lookback_window_is_an_absolute_date_filter() {
    let tmp = tempfile::tempdir().unwrap();
    // 20 days of history; a 3-day lookback with no margin must keep only
    // the last 4 dates (cutoff minus 0..=3), regardless of row counts.
    for offset in 0..20 {
        write_candle_day(tmp.path(), base_date() + Duration::days(offset), "7203", 1000.0);
    }
    let cutoff = base_date() + Duration::days(19);
    let store = store(tmp.path()).with_safety_margin(0);

    let loaded = store.load_candles_until(cutoff, 3).unwrap();
    let series = &loaded.by_symbol["7203"];
    assert_eq!(series.len(), 4);
    let earliest = cutoff - Duration::days(3);
    assert!(series.iter().all(|c| c.ts.date() >= earliest));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Sweeping cutoffs and lookbacks over a fixed layout: the returned
    /// window always sits inside [cutoff - lookback - margin, cutoff].
    #[test]
    fn windowing_is_always_leak_free(cutoff_offset in 0i64..15, lookback in 1u32..10) {
        let tmp = tempfile::tempdir().unwrap();
        for offset in 0..15 {
            write_candle_day(tmp.path(), base_date() + Duration::days(offset), "7203", 1000.0 + offset as f64);
        }
        let store = store(tmp.path()).with_safety_margin(2);
        let cutoff = base_date() + Duration::days(cutoff_offset);

        let loaded = store.load_candles_until(cutoff, lookback).unwrap();
        let earliest = cutoff - Duration::days(lookback as i64 + 2);
        for series in loaded.by_symbol.values() {
            prop_assert!(series.iter().all(|c| c.ts.date() <= cutoff));
            prop_assert!(series.iter().all(|c| c.ts.date() >= earliest));
        }
    }
}
