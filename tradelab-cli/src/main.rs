//! TradeLab CLI — evaluate trades and manage the trade journal.
//!
//! Commands:
//! - `evaluate` — compute investment, P&L, return % and excursion for one trade
//! - `add` / `edit` / `delete` — change the journal
//! - `list` / `recent` — show journal trades, newest first
//! - `import` / `export` — CSV in and out
//! - `stats` — journal summary statistics
//! - `ticks` — print the effective futures tick table

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tradelab_core::{Config, Journal, JournalStats, RawTrade, Trade, TradeEntry};

#[derive(Parser)]
#[command(name = "tradelab", about = "TradeLab CLI — trading journal and P&L calculator")]
struct Cli {
    /// Path to the TOML config file. Missing file means defaults.
    #[arg(long, global = true, default_value = "tradelab.toml")]
    config: PathBuf,

    /// Journal file (overrides `journal.path` from the config).
    #[arg(long, global = true)]
    journal: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single trade without touching the journal.
    Evaluate {
        #[command(flatten)]
        trade: TradeArgs,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Add a trade to the journal.
    Add {
        #[command(flatten)]
        trade: TradeArgs,
    },
    /// Replace a journal trade (by id or unique id prefix) and recompute it.
    Edit {
        id: String,

        #[command(flatten)]
        trade: TradeArgs,
    },
    /// Delete a journal trade by id or unique id prefix.
    Delete { id: String },
    /// List every journal trade, newest first.
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show the most recent trades.
    Recent {
        /// Number of trades. Defaults to `journal.recent_limit` (10).
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Import trades from a CSV file with a header row.
    Import { file: PathBuf },
    /// Export the journal, with derived columns, to a CSV file.
    Export { file: PathBuf },
    /// Summary statistics over the journal.
    Stats {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the effective futures tick table.
    Ticks,
}

/// Trade fields as typed on the command line.
#[derive(Args)]
struct TradeArgs {
    /// Ticker or futures contract (e.g., AAPL, ES, ESZ4).
    #[arg(long)]
    symbol: String,

    /// Stocks, Options, Futures, Forex, Crypto, or any other market name.
    #[arg(long, default_value = "Stocks")]
    market: String,

    /// Long or Short.
    #[arg(long)]
    direction: String,

    /// Entry price.
    #[arg(long)]
    entry: String,

    /// Exit price. Omit for an open position.
    #[arg(long)]
    exit: Option<String>,

    /// Units or contracts; the sign is ignored in calculations.
    #[arg(long, allow_hyphen_values = true)]
    quantity: String,

    /// Trade date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

impl TradeArgs {
    fn into_entry(self) -> Result<TradeEntry> {
        let raw = RawTrade {
            date: self.date.unwrap_or_else(|| chrono::Local::now().date_naive().to_string()),
            symbol: self.symbol,
            market: self.market,
            direction: self.direction,
            entry_price: self.entry,
            exit_price: self.exit.unwrap_or_default(),
            quantity: self.quantity,
            notes: self.notes.unwrap_or_default(),
        };
        Ok(TradeEntry::parse(&raw)?)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    if let Some(path) = cli.journal {
        config.journal.path = path;
    }
    debug!(journal = %config.journal.path.display(), "configuration loaded");

    match cli.command {
        Commands::Evaluate { trade, json } => run_evaluate(&config, trade, json),
        Commands::Add { trade } => run_add(&config, trade),
        Commands::Edit { id, trade } => run_edit(&config, &id, trade),
        Commands::Delete { id } => run_delete(&config, &id),
        Commands::List { json } => {
            let journal = open_journal(&config)?;
            print_trades(&journal.trades(), json)
        }
        Commands::Recent { limit, json } => {
            let limit = limit.unwrap_or(config.journal.recent_limit);
            if limit == 0 {
                bail!("--limit must be at least 1");
            }
            let journal = open_journal(&config)?;
            print_trades(&journal.recent(limit), json)
        }
        Commands::Import { file } => run_import(&config, &file),
        Commands::Export { file } => run_export(&config, &file),
        Commands::Stats { json } => run_stats(&config, json),
        Commands::Ticks => run_ticks(&config),
    }
}

/// Fallback log level when `RUST_LOG` is unset.
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn init_tracing(verbose: u8) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn open_journal(config: &Config) -> Result<Journal> {
    let calculator = config.calculator()?;
    Journal::open(&config.journal.path, calculator)
        .with_context(|| format!("opening journal {}", config.journal.path.display()))
}

fn run_evaluate(config: &Config, trade: TradeArgs, json: bool) -> Result<()> {
    let calculator = config.calculator()?;
    let trade = calculator.evaluate(trade.into_entry()?)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&trade)?);
        return Ok(());
    }

    let entry = trade.entry();
    let metrics = trade.metrics();
    println!("=== {} {} {} ===", entry.direction(), entry.symbol(), entry.market());
    println!("Date:            {}", entry.date());
    println!("Entry:           {}", entry.entry_price());
    println!("Exit:            {}", fmt_opt_raw(entry.exit_price()));
    println!("Quantity:        {}", entry.quantity());
    println!("Investment:      {:.2}", metrics.investment);
    println!("P&L:             {}", fmt_opt(metrics.profit_loss));
    println!("P&L %:           {}", fmt_opt(metrics.profit_loss_percentage));
    println!("Max runup:       {}", fmt_opt(metrics.max_runup));
    println!("Max drawdown:    {}", fmt_opt(metrics.max_drawdown));
    Ok(())
}

fn run_add(config: &Config, trade: TradeArgs) -> Result<()> {
    let mut journal = open_journal(config)?;
    let id = journal.add(trade.into_entry()?)?;
    println!("Added trade {id}");
    Ok(())
}

fn run_edit(config: &Config, id: &str, trade: TradeArgs) -> Result<()> {
    let mut journal = open_journal(config)?;
    let id = journal.resolve(id)?;
    let new_id = journal.update(&id, trade.into_entry()?)?;
    println!("Updated trade {id} → {new_id}");
    Ok(())
}

fn run_delete(config: &Config, id: &str) -> Result<()> {
    let mut journal = open_journal(config)?;
    let id = journal.resolve(id)?;
    let removed = journal.delete(&id)?;
    println!("Deleted trade {id} ({} {})", removed.entry().date(), removed.entry().symbol());
    Ok(())
}

fn run_import(config: &Config, file: &Path) -> Result<()> {
    let reader = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let mut journal = open_journal(config)?;
    let report = journal.import_csv(reader)?;

    println!("Imported:   {}", report.imported);
    println!("Duplicates: {}", report.duplicates);
    println!("Rejected:   {}", report.rejected.len());
    for row in &report.rejected {
        eprintln!("  line {}: {}", row.line, row.message);
    }
    if report.imported == 0 && !report.rejected.is_empty() {
        bail!("no rows imported from {}", file.display());
    }
    Ok(())
}

fn run_export(config: &Config, file: &Path) -> Result<()> {
    let journal = open_journal(config)?;
    let writer = File::create(file).with_context(|| format!("creating {}", file.display()))?;
    let count = journal.export_csv(writer)?;
    println!("Exported {count} trades to {}", file.display());
    Ok(())
}

fn run_stats(config: &Config, json: bool) -> Result<()> {
    let journal = open_journal(config)?;
    let stats = JournalStats::compute(journal.trades());
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("=== Journal Summary ===");
    println!("Trades:          {} ({} open)", stats.total_trades, stats.open_trades);
    println!(
        "Closed:          {} ({} W / {} L / {} BE)",
        stats.closed_trades, stats.winners, stats.losers, stats.breakeven
    );
    println!("Win rate:        {:.1}%", stats.win_rate * 100.0);
    println!("Total P&L:       {:.2}", stats.total_pnl);
    println!("Gross profit:    {:.2}", stats.gross_profit);
    println!("Gross loss:      {:.2}", stats.gross_loss);
    println!("Profit factor:   {:.2}", stats.profit_factor);
    println!("Average win:     {:.2}", stats.average_win);
    println!("Average loss:    {:.2}", stats.average_loss);
    println!("Largest win:     {:.2}", stats.largest_win);
    println!("Largest loss:    {:.2}", stats.largest_loss);
    println!("Invested:        {:.2}", stats.total_investment);
    println!("ROI:             {:.2}%", stats.return_on_investment);
    println!(
        "Streaks:         {} wins / {} losses",
        stats.max_consecutive_wins, stats.max_consecutive_losses
    );
    println!("P&L drawdown:    {:.2}", stats.max_pnl_drawdown);
    Ok(())
}

fn run_ticks(config: &Config) -> Result<()> {
    let table = config.tick_table()?;
    println!("{:<8} {:>12} {:>12}", "Root", "Tick size", "Tick value");
    for (root, spec) in table.iter() {
        println!("{:<8} {:>12} {:>12.4}", root, spec.tick_size, spec.tick_value);
    }
    Ok(())
}

fn print_trades(trades: &[&Trade], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(trades)?);
        return Ok(());
    }
    if trades.is_empty() {
        println!("No trades.");
        return Ok(());
    }

    println!(
        "{:<16} {:<10} {:<8} {:<8} {:<5} {:>10} {:>10} {:>8} {:>12} {:>10} {:>8}",
        "ID", "Date", "Symbol", "Market", "Dir", "Entry", "Exit", "Qty", "Investment", "P&L", "P&L %"
    );
    for trade in trades {
        let entry = trade.entry();
        let metrics = trade.metrics();
        println!(
            "{:<16} {:<10} {:<8} {:<8} {:<5} {:>10} {:>10} {:>8} {:>12.2} {:>10} {:>8}",
            trade.id(),
            entry.date(),
            entry.symbol(),
            entry.market(),
            entry.direction(),
            entry.entry_price(),
            fmt_opt_raw(entry.exit_price()),
            entry.quantity(),
            metrics.investment,
            fmt_opt(metrics.profit_loss),
            fmt_opt(metrics.profit_loss_percentage),
        );
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn fmt_opt_raw(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
