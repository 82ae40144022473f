//! Windowed, leak-safe access to on-disk candle and order-book data.
//!
//! Layout: one directory per trading day, one CSV per symbol.
//!
//! ```text
//! <candle_dir>/<YYYYMMDD>/<symbol>.csv   ts,open,high,low,close,volume
//! <book_dir>/<YYYYMMDD>/<symbol>.csv     ts,bid_px_1..K,bid_qty_1..K,ask_px_1..K,ask_qty_1..K
//! ```
//!
//! Every returned row is re-validated against the requested cutoff/date
//! after parsing. Filtering is by absolute date window, never by row
//! count, so a source directory spanning more history than requested
//! cannot silently widen the window.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::domain::{BookLevel, Candle, OrderBookSnapshot};
use crate::error::DataError;

/// Extra calendar days added to the lookback window when converting
/// trading days to calendar days (weekends and holidays inflate the span).
const DEFAULT_SAFETY_MARGIN_DAYS: u32 = 7;

/// Candle series per symbol for one cutoff window, plus row accounting.
#[derive(Debug, Default)]
pub struct LoadedCandles {
    pub by_symbol: HashMap<String, Vec<Candle>>,
    /// Rows dropped for unparseable timestamps or values.
    pub dropped_rows: usize,
}

/// Order-book snapshots per symbol for one day, plus row accounting.
#[derive(Debug, Default)]
pub struct LoadedBook {
    pub by_symbol: HashMap<String, Vec<OrderBookSnapshot>>,
    /// Rows dropped for unparseable timestamps or values.
    pub dropped_rows: usize,
    /// Parsed snapshots dropped because rank 1 was missing on a side.
    pub unusable_snapshots: usize,
}

/// Filesystem-backed data store with leak detection.
#[derive(Debug, Clone)]
pub struct DataStore {
    candle_dir: PathBuf,
    book_dir: PathBuf,
    safety_margin_days: u32,
}

impl DataStore {
    pub fn new(
        candle_dir: impl Into<PathBuf>,
        book_dir: impl Into<PathBuf>,
    ) -> Result<Self, DataError> {
        let candle_dir = candle_dir.into();
        let book_dir = book_dir.into();
        if !candle_dir.is_dir() {
            return Err(DataError::NotFound {
                what: format!("candle directory {}", candle_dir.display()),
            });
        }
        if !book_dir.is_dir() {
            return Err(DataError::NotFound {
                what: format!("order-book directory {}", book_dir.display()),
            });
        }
        Ok(Self {
            candle_dir,
            book_dir,
            safety_margin_days: DEFAULT_SAFETY_MARGIN_DAYS,
        })
    }

    /// Override the calendar-day safety margin added to the lookback window.
    pub fn with_safety_margin(mut self, days: u32) -> Self {
        self.safety_margin_days = days;
        self
    }

    /// Load all candle rows dated in `[cutoff - lookback - margin, cutoff]`.
    ///
    /// Any parsed row dated after `cutoff` is a fatal `DataError::Leak`.
    /// Rows older than the window are dropped silently (window filtering,
    /// not an error); rows with unparseable timestamps are dropped and
    /// counted. Series come back ascending and deduplicated by timestamp.
    pub fn load_candles_until(
        &self,
        cutoff: NaiveDate,
        lookback_days: u32,
    ) -> Result<LoadedCandles, DataError> {
        let earliest = cutoff - Duration::days((lookback_days + self.safety_margin_days) as i64);
        let mut loaded = LoadedCandles::default();

        for day_dir in day_directories(&self.candle_dir)? {
            // Directory-level window check first; the row-level check below
            // still applies because a directory may be mislabeled.
            if day_dir.date > cutoff || day_dir.date < earliest {
                continue;
            }
            for file in symbol_files(&day_dir.path)? {
                let rows = read_candle_file(&file.path, &file.symbol, cutoff, earliest)?;
                loaded.dropped_rows += rows.dropped;
                loaded
                    .by_symbol
                    .entry(file.symbol)
                    .or_default()
                    .extend(rows.candles);
            }
        }

        for series in loaded.by_symbol.values_mut() {
            series.sort_by_key(|c| c.ts);
            series.dedup_by_key(|c| c.ts);
        }
        Ok(loaded)
    }

    /// Load the order-book snapshots for exactly `date`.
    ///
    /// A missing day directory is `DataError::NotFound` (recoverable: the
    /// driver skips the day). Any parsed row dated other than `date` is a
    /// fatal `DataError::Leak`.
    pub fn load_book_for(&self, date: NaiveDate) -> Result<LoadedBook, DataError> {
        let dir = self.book_dir.join(date.format("%Y%m%d").to_string());
        if !dir.is_dir() {
            return Err(DataError::NotFound {
                what: format!("order book for {date}"),
            });
        }

        let mut loaded = LoadedBook::default();
        for file in symbol_files(&dir)? {
            let rows = read_book_file(&file.path, &file.symbol, date)?;
            loaded.dropped_rows += rows.dropped;
            loaded.unusable_snapshots += rows.unusable;
            loaded
                .by_symbol
                .entry(file.symbol)
                .or_default()
                .extend(rows.snapshots);
        }

        for series in loaded.by_symbol.values_mut() {
            series.sort_by_key(|s| s.ts);
        }
        Ok(loaded)
    }
}

// ─── Directory scanning ──────────────────────────────────────────────

struct DayDirectory {
    path: PathBuf,
    date: NaiveDate,
}

struct SymbolFile {
    path: PathBuf,
    symbol: String,
}

/// Subdirectories named `YYYYMMDD`; anything else is ignored.
fn day_directories(root: &Path) -> Result<Vec<DayDirectory>, DataError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Ok(date) = NaiveDate::parse_from_str(name, "%Y%m%d") else {
            continue;
        };
        dirs.push(DayDirectory {
            path: entry.path(),
            date,
        });
    }
    dirs.sort_by_key(|d| d.date);
    Ok(dirs)
}

/// `<symbol>.csv` files within a day directory.
fn symbol_files(dir: &Path) -> Result<Vec<SymbolFile>, DataError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(symbol) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        files.push(SymbolFile {
            symbol: symbol.to_string(),
            path,
        });
    }
    files.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    Ok(files)
}

// ─── Row parsing ─────────────────────────────────────────────────────

/// Accepted timestamp formats, tried in order. Date-only rows are daily
/// candles and anchor at midnight.
fn parse_ts(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_f64(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse().ok()
}

struct CandleRows {
    candles: Vec<Candle>,
    dropped: usize,
}

fn read_candle_file(
    path: &Path,
    symbol: &str,
    cutoff: NaiveDate,
    earliest: NaiveDate,
) -> Result<CandleRows, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);

    let (Some(ts_i), Some(open_i), Some(high_i), Some(low_i), Some(close_i)) = (
        col("ts"),
        col("open"),
        col("high"),
        col("low"),
        col("close"),
    ) else {
        return Err(DataError::Malformed {
            path: path.display().to_string(),
            reason: "missing one of ts,open,high,low,close".into(),
        });
    };
    let volume_i = col("volume");

    let mut rows = CandleRows {
        candles: Vec::new(),
        dropped: 0,
    };
    for record in reader.records() {
        let record = record?;
        let Some(ts) = record.get(ts_i).and_then(parse_ts) else {
            rows.dropped += 1;
            continue;
        };
        if ts.date() > cutoff {
            return Err(DataError::Leak {
                path: path.display().to_string(),
                ts,
                cutoff,
            });
        }
        if ts.date() < earliest {
            continue;
        }
        let fields = (
            record.get(open_i).and_then(parse_f64),
            record.get(high_i).and_then(parse_f64),
            record.get(low_i).and_then(parse_f64),
            record.get(close_i).and_then(parse_f64),
        );
        let (Some(open), Some(high), Some(low), Some(close)) = fields else {
            rows.dropped += 1;
            continue;
        };
        let volume = volume_i
            .and_then(|i| record.get(i))
            .and_then(parse_f64)
            .unwrap_or(0.0);
        rows.candles.push(Candle {
            symbol: symbol.to_string(),
            ts,
            open,
            high,
            low,
            close,
            volume,
        });
    }
    Ok(rows)
}

struct BookRows {
    snapshots: Vec<OrderBookSnapshot>,
    dropped: usize,
    unusable: usize,
}

fn read_book_file(path: &Path, symbol: &str, date: NaiveDate) -> Result<BookRows, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);

    let Some(ts_i) = col("ts") else {
        return Err(DataError::Malformed {
            path: path.display().to_string(),
            reason: "missing ts column".into(),
        });
    };

    // Discover the book depth from the header: ranks are contiguous from 1.
    let mut rank_cols = Vec::new();
    for rank in 1.. {
        let cols = (
            col(&format!("bid_px_{rank}")),
            col(&format!("bid_qty_{rank}")),
            col(&format!("ask_px_{rank}")),
            col(&format!("ask_qty_{rank}")),
        );
        match cols {
            (Some(bp), Some(bq), Some(ap), Some(aq)) => rank_cols.push((bp, bq, ap, aq)),
            _ => break,
        }
    }
    if rank_cols.is_empty() {
        return Err(DataError::Malformed {
            path: path.display().to_string(),
            reason: "no bid/ask rank columns".into(),
        });
    }

    let mut rows = BookRows {
        snapshots: Vec::new(),
        dropped: 0,
        unusable: 0,
    };
    for record in reader.records() {
        let record = record?;
        let Some(ts) = record.get(ts_i).and_then(parse_ts) else {
            rows.dropped += 1;
            continue;
        };
        if ts.date() != date {
            return Err(DataError::Leak {
                path: path.display().to_string(),
                ts,
                cutoff: date,
            });
        }

        // Ranks are trailing-optional; a blank pair leaves a shallower side.
        let mut bids = Vec::new();
        let mut asks = Vec::new();
        for &(bp, bq, ap, aq) in &rank_cols {
            if let (Some(price), Some(qty)) = (
                record.get(bp).and_then(parse_f64),
                record.get(bq).and_then(parse_f64),
            ) {
                bids.push(BookLevel { price, qty });
            }
            if let (Some(price), Some(qty)) = (
                record.get(ap).and_then(parse_f64),
                record.get(aq).and_then(parse_f64),
            ) {
                asks.push(BookLevel { price, qty });
            }
        }

        let snapshot = OrderBookSnapshot {
            ts,
            symbol: symbol.to_string(),
            bids,
            asks,
        };
        if snapshot.is_usable() {
            rows.snapshots.push(snapshot);
        } else {
            rows.unusable += 1;
        }
    }
    Ok(rows)
}
