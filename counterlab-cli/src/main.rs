//! CounterLab CLI — run backtests and inspect generated levels.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML config file and write artifacts
//! - `levels` — generate and print the level set for one cutoff date

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use counterlab_core::data::DataStore;
use counterlab_core::levels::generate;
use counterlab_runner::{run_backtest, save_artifacts, BacktestReport, RunConfig};

#[derive(Parser)]
#[command(
    name = "counterlab",
    about = "CounterLab CLI — mean-reversion backtesting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to the TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Override the config's start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// Override the config's end date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,

        /// Directory for artifacts (trades.csv, levels.jsonl, summary.json).
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },
    /// Generate the level set for one cutoff date and print it as JSONL.
    Levels {
        /// Path to the TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Cutoff date (YYYY-MM-DD): levels use data up to this day.
        #[arg(long)]
        date: String,

        /// Restrict output to one symbol.
        #[arg(long)]
        symbol: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            start,
            end,
            out_dir,
        } => cmd_run(&config, start.as_deref(), end.as_deref(), &out_dir),
        Commands::Levels {
            config,
            date,
            symbol,
        } => cmd_levels(&config, &date, symbol.as_deref()),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

fn cmd_run(
    config_path: &PathBuf,
    start: Option<&str>,
    end: Option<&str>,
    out_dir: &PathBuf,
) -> Result<()> {
    let mut config = RunConfig::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if let Some(start) = start {
        config.backtest.start = parse_date(start)?;
    }
    if let Some(end) = end {
        config.backtest.end = parse_date(end)?;
    }
    if config.backtest.start > config.backtest.end {
        bail!(
            "start {} is after end {}",
            config.backtest.start,
            config.backtest.end
        );
    }

    println!(
        "Running backtest {} → {} (run {})",
        config.backtest.start,
        config.backtest.end,
        &config.run_id()[..12]
    );
    let report = run_backtest(&config)?;
    save_artifacts(out_dir, &report)?;
    print_summary(&report);
    println!("\nArtifacts written to {}", out_dir.display());
    Ok(())
}

fn cmd_levels(config_path: &PathBuf, date: &str, symbol: Option<&str>) -> Result<()> {
    let config = RunConfig::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let cutoff = parse_date(date)?;

    let store = DataStore::new(
        config.backtest.candle_dir.clone(),
        config.backtest.book_dir.clone(),
    )?;
    let candles = store.load_candles_until(cutoff, config.backtest.lookback_days)?;

    let mut symbols: Vec<&String> = candles.by_symbol.keys().collect();
    symbols.sort();
    for sym in symbols {
        if symbol.is_some_and(|s| s != sym.as_str()) {
            continue;
        }
        let levels = generate(sym, &candles.by_symbol[sym], cutoff, &config.levels);
        for level in levels {
            println!("{}", serde_json::to_string(&level)?);
        }
    }
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    let s = &report.summary.overall;
    println!("\n=== Summary ===");
    println!("Trades:        {}", s.total_trades);
    println!("Win rate:      {:.1}%", s.win_rate * 100.0);
    println!("Total PnL:     {:+.1} ticks", s.total_pnl);
    println!("Avg PnL:       {:+.2} ticks", s.avg_pnl);
    println!("Max win/loss:  {:+.1} / {:+.1}", s.max_win, s.max_loss);
    println!("Profit factor: {:.2}", s.profit_factor);
    println!("Avg hold:      {:.1} bars", s.avg_hold_bars);

    if !report.summary.by_exit_reason.is_empty() {
        println!("\nBy exit reason:");
        for (reason, sub) in &report.summary.by_exit_reason {
            println!(
                "  {reason:16} {:4} trades, {:+.1} ticks",
                sub.total_trades, sub.total_pnl
            );
        }
    }

    let skipped: Vec<_> = report
        .outcome
        .days
        .iter()
        .filter(|d| d.skipped)
        .map(|d| d.date)
        .collect();
    if !skipped.is_empty() {
        println!("\nSkipped days (no order-book data):");
        for date in skipped {
            println!("  {date}");
        }
    }
    let zero_activity: Vec<_> = report
        .outcome
        .days
        .iter()
        .filter(|d| !d.skipped && !d.zero_trades.is_empty())
        .collect();
    if !zero_activity.is_empty() {
        println!("\nZero-trade instruments by day:");
        for day in zero_activity {
            println!("  {}: {}", day.date, day.zero_trades.join(", "));
        }
    }
}
