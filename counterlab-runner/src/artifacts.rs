//! Artifact export: trade tape CSV, level JSONL, summary JSON.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use counterlab_core::domain::{Level, Trade};

use crate::runner::BacktestReport;

/// Write the trade tape as CSV, one row per closed trade.
pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;
    for trade in trades {
        writer
            .serialize(trade)
            .with_context(|| format!("failed to write trade for {}", trade.symbol))?;
    }
    writer.flush().context("failed to flush trades CSV")?;
    Ok(())
}

/// Write levels as JSON lines, one level per line, tagged with the day
/// they were generated for.
pub fn write_levels_jsonl(path: &Path, levels: &[Level]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create levels JSONL {}", path.display()))?;
    for level in levels {
        let line = serde_json::to_string(level).context("failed to serialize level")?;
        writeln!(file, "{line}")?;
    }
    Ok(())
}

/// Write the full report (summary, day reports, run identity) as JSON.
pub fn write_summary_json(path: &Path, report: &BacktestReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write summary JSON {}", path.display()))?;
    Ok(())
}

/// Write the standard artifact set into `out_dir`:
/// `trades.csv`, `levels.jsonl`, `summary.json`.
pub fn save_artifacts(out_dir: &Path, report: &BacktestReport) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;
    write_trades_csv(&out_dir.join("trades.csv"), &report.outcome.trades)?;
    write_levels_jsonl(&out_dir.join("levels.jsonl"), &report.outcome.levels)?;
    write_summary_json(&out_dir.join("summary.json"), report)?;
    Ok(())
}
