//! End-to-end driver scenarios over synthetic per-day data directories.

use chrono::NaiveDate;
use counterlab_core::data::DataStore;
use counterlab_core::domain::ExitReason;
use counterlab_core::engine::{run_simulation, SimulationSettings};
use counterlab_core::error::DataError;
use std::path::Path;

/// Monday and Tuesday of a plain trading week.
fn cutoff_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 19).unwrap()
}

fn trade_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()
}

fn write_candles(root: &Path, date: NaiveDate, symbol: &str, close: f64) {
    let dir = root.join("candles").join(date.format("%Y%m%d").to_string());
    std::fs::create_dir_all(&dir).unwrap();
    let date_str = date.format("%Y-%m-%d");
    std::fs::write(
        dir.join(format!("{symbol}.csv")),
        format!(
            "ts,open,high,low,close,volume\n\
             {date_str} 09:03:00,{close},{h},{l},{close},1500\n\
             {date_str} 15:00:00,{close},{h},{l},{close},900\n",
            h = close + 3.0,
            l = close - 3.0,
        ),
    )
    .unwrap();
}

/// Book rows that enter long at ~1000 and ride to the profit target.
fn write_winning_book(root: &Path, date: NaiveDate, symbol: &str) {
    let dir = root.join("book").join(date.format("%Y%m%d").to_string());
    std::fs::create_dir_all(&dir).unwrap();
    let date_str = date.format("%Y-%m-%d");
    // Bid-heavy depth: quantity imbalance and micro-bias point upward.
    std::fs::write(
        dir.join(format!("{symbol}.csv")),
        format!(
            "ts,bid_px_1,bid_qty_1,ask_px_1,ask_qty_1\n\
             {date_str} 09:30:00,999.5,200,1000.5,100\n\
             {date_str} 09:31:00,1004.5,200,1005.5,100\n\
             {date_str} 09:32:00,1009.5,200,1010.5,100\n",
        ),
    )
    .unwrap();
}

fn store(root: &Path) -> DataStore {
    std::fs::create_dir_all(root.join("candles")).unwrap();
    std::fs::create_dir_all(root.join("book")).unwrap();
    DataStore::new(root.join("candles"), root.join("book")).unwrap()
}

/// Levels strong enough for the default strength threshold: a single
/// psychological level lands on 1000.
fn settings() -> SimulationSettings {
    let mut settings = SimulationSettings::new(trade_day(), trade_day());
    settings.levels = counterlab_core::levels::LevelConfig::all_disabled();
    settings.levels.psychological.enable = true;
    settings.levels.psychological.strength = 0.8;
    settings
}

#[test]
fn winning_long_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    write_candles(tmp.path(), cutoff_day(), "7203", 1000.0);
    write_winning_book(tmp.path(), trade_day(), "7203");

    let outcome = run_simulation(&store(tmp.path()), &settings()).unwrap();

    assert_eq!(outcome.trades.len(), 1);
    let trade = &outcome.trades[0];
    assert_eq!(trade.symbol, "7203");
    assert_eq!(trade.exit_reason, ExitReason::ProfitTarget);
    assert_eq!(trade.entry_price, 1000.0);
    assert_eq!(trade.pnl_ticks, 10.0);

    assert_eq!(outcome.days.len(), 1);
    let day = &outcome.days[0];
    assert_eq!(day.simulated, vec!["7203".to_string()]);
    assert_eq!(day.trade_count, 1);
    assert!(day.level_count > 0);
    assert!(day.zero_trades.is_empty());
}

#[test]
fn run_is_deterministic() {
    let tmp = tempfile::tempdir().unwrap();
    for symbol in ["7203", "9984", "6758"] {
        write_candles(tmp.path(), cutoff_day(), symbol, 1000.0);
        write_winning_book(tmp.path(), trade_day(), symbol);
    }
    let store = store(tmp.path());
    let settings = settings();

    let a = run_simulation(&store, &settings).unwrap();
    let b = run_simulation(&store, &settings).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn trades_are_sorted_by_entry_then_symbol() {
    let tmp = tempfile::tempdir().unwrap();
    for symbol in ["9984", "7203", "6758"] {
        write_candles(tmp.path(), cutoff_day(), symbol, 1000.0);
        write_winning_book(tmp.path(), trade_day(), symbol);
    }
    let outcome = run_simulation(&store(tmp.path()), &settings()).unwrap();
    assert_eq!(outcome.trades.len(), 3);
    let symbols: Vec<&str> = outcome.trades.iter().map(|t| t.symbol.as_str()).collect();
    // Same entry timestamp for all three → symbol order breaks the tie.
    assert_eq!(symbols, vec!["6758", "7203", "9984"]);
}

#[test]
fn at_most_one_open_position_per_symbol() {
    let tmp = tempfile::tempdir().unwrap();
    for symbol in ["7203", "9984"] {
        write_candles(tmp.path(), cutoff_day(), symbol, 1000.0);
        write_winning_book(tmp.path(), trade_day(), symbol);
    }
    let outcome = run_simulation(&store(tmp.path()), &settings()).unwrap();

    for symbol in ["7203", "9984"] {
        let mut trades: Vec<_> = outcome.trades_for(symbol).collect();
        trades.sort_by_key(|t| t.entry_ts);
        for pair in trades.windows(2) {
            assert!(
                pair[0].exit_ts <= pair[1].entry_ts,
                "overlapping positions for {symbol}"
            );
        }
    }
}

#[test]
fn excluded_instrument_is_skipped_entirely() {
    let tmp = tempfile::tempdir().unwrap();
    write_candles(tmp.path(), cutoff_day(), "7203", 1000.0);
    write_winning_book(tmp.path(), trade_day(), "7203");

    let mut settings = settings();
    settings.excluded.push("7203".into());
    let outcome = run_simulation(&store(tmp.path()), &settings).unwrap();

    assert!(outcome.trades.is_empty());
    assert!(outcome.days[0].simulated.is_empty());
}

#[test]
fn universe_instrument_without_data_is_reported_not_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    write_candles(tmp.path(), cutoff_day(), "7203", 1000.0);
    write_winning_book(tmp.path(), trade_day(), "7203");

    let mut settings = settings();
    settings.universe = vec!["7203".into(), "9984".into()];
    let outcome = run_simulation(&store(tmp.path()), &settings).unwrap();

    let day = &outcome.days[0];
    assert_eq!(day.simulated, vec!["7203".to_string()]);
    assert_eq!(day.missing_data, vec!["9984".to_string()]);
    assert_eq!(outcome.trades.len(), 1);
}

#[test]
fn missing_book_day_is_skipped_and_reported() {
    let tmp = tempfile::tempdir().unwrap();
    write_candles(tmp.path(), cutoff_day(), "7203", 1000.0);
    write_winning_book(tmp.path(), trade_day(), "7203");
    // Extend the range over Wednesday, which has no book directory.
    let mut settings = settings();
    settings.end = NaiveDate::from_ymd_opt(2026, 1, 21).unwrap();

    let outcome = run_simulation(&store(tmp.path()), &settings).unwrap();
    assert_eq!(outcome.days.len(), 2);
    assert!(!outcome.days[0].skipped);
    assert!(outcome.days[1].skipped);
    assert_eq!(outcome.trades.len(), 1);
}

#[test]
fn all_level_kinds_disabled_yields_zero_trades_not_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    write_candles(tmp.path(), cutoff_day(), "7203", 1000.0);
    write_winning_book(tmp.path(), trade_day(), "7203");

    let mut settings = settings();
    settings.levels = counterlab_core::levels::LevelConfig::all_disabled();
    let outcome = run_simulation(&store(tmp.path()), &settings).unwrap();

    assert!(outcome.trades.is_empty());
    assert!(outcome.levels.is_empty());
    let day = &outcome.days[0];
    assert_eq!(day.zero_levels, vec!["7203".to_string()]);
    assert_eq!(day.zero_trades, vec!["7203".to_string()]);
}

#[test]
fn leak_in_candle_window_aborts_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    write_candles(tmp.path(), cutoff_day(), "7203", 1000.0);
    // The cutoff-day directory hides a row from the trade day itself.
    let dir = tmp
        .path()
        .join("candles")
        .join(cutoff_day().format("%Y%m%d").to_string());
    std::fs::write(
        dir.join("9984.csv"),
        format!(
            "ts,open,high,low,close,volume\n{} 09:03:00,500,502,498,500,100\n",
            trade_day().format("%Y-%m-%d")
        ),
    )
    .unwrap();
    write_winning_book(tmp.path(), trade_day(), "7203");

    let err = run_simulation(&store(tmp.path()), &settings()).unwrap_err();
    assert!(matches!(err, DataError::Leak { .. }));
}

#[test]
fn overnight_carry_keeps_position_open() {
    let tmp = tempfile::tempdir().unwrap();
    write_candles(tmp.path(), cutoff_day(), "7203", 1000.0);
    // A book whose mid never moves: no price exit, no session change
    // inside the row span, so the position survives to the day end.
    let dir = tmp
        .path()
        .join("book")
        .join(trade_day().format("%Y%m%d").to_string());
    std::fs::create_dir_all(&dir).unwrap();
    let date_str = trade_day().format("%Y-%m-%d");
    std::fs::write(
        dir.join("7203.csv"),
        format!(
            "ts,bid_px_1,bid_qty_1,ask_px_1,ask_qty_1\n\
             {date_str} 09:30:00,999.5,200,1000.5,100\n\
             {date_str} 09:31:00,999.5,200,1000.5,100\n",
        ),
    )
    .unwrap();

    let mut settings = settings();
    settings.carry_positions = true;
    let outcome = run_simulation(&store(tmp.path()), &settings).unwrap();

    assert!(outcome.trades.is_empty());
    assert_eq!(outcome.days[0].zero_trades, vec!["7203".to_string()]);
}

#[test]
fn without_carry_day_end_flattens_as_hold_time_limit() {
    let tmp = tempfile::tempdir().unwrap();
    write_candles(tmp.path(), cutoff_day(), "7203", 1000.0);
    let dir = tmp
        .path()
        .join("book")
        .join(trade_day().format("%Y%m%d").to_string());
    std::fs::create_dir_all(&dir).unwrap();
    let date_str = trade_day().format("%Y-%m-%d");
    std::fs::write(
        dir.join("7203.csv"),
        format!(
            "ts,bid_px_1,bid_qty_1,ask_px_1,ask_qty_1\n\
             {date_str} 09:30:00,999.5,200,1000.5,100\n\
             {date_str} 09:31:00,1001.5,200,1002.5,100\n",
        ),
    )
    .unwrap();

    let outcome = run_simulation(&store(tmp.path()), &settings()).unwrap();
    assert_eq!(outcome.trades.len(), 1);
    let trade = &outcome.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::HoldTimeLimit);
    assert_eq!(trade.exit_price, 1002.0);
}
