//! TradeLab Core — trade journal domain types and P&L calculation.
//!
//! This crate contains:
//! - Domain types (raw input, validated entries, evaluated trades, markets)
//! - Futures tick table with contract-month symbol resolution
//! - Trade calculator (investment, P&L, return %, runup/drawdown)
//! - JSONL journal store with CSV import/export
//! - Journal statistics
//! - TOML configuration

pub mod calculator;
pub mod config;
pub mod domain;
pub mod journal;
pub mod stats;

pub use calculator::{
    compute_excursion, compute_investment, compute_profit_loss, compute_profit_loss_percentage,
    CalcError, Excursion, PnlPath, TradeCalculator,
};
pub use config::{Config, ConfigError};
pub use domain::{
    Direction, Market, RawTrade, TickSpec, TickTable, TickTableError, Trade, TradeEntry,
    TradeError, TradeFields, TradeId, TradeMetrics,
};
pub use journal::{ImportReport, Journal, JournalError, RowError};
pub use stats::JournalStats;
