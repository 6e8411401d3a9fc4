//! Trade journal — JSONL persistence of evaluated trades.
//!
//! One trade per line, written with its id and derived metrics for readers
//! of the raw file. On load only the base fields are read back; every trade is
//! re-evaluated, so derived values always match the current tick table.
//!
//! Appends go straight to the end of the file. Edits and deletes rewrite the
//! whole file through a temporary sibling and a rename.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::calculator::{CalcError, TradeCalculator};
use crate::domain::{RawTrade, Trade, TradeEntry, TradeError, TradeId};

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("journal line {line} is not a valid trade: {source}")]
    Corrupt {
        line: usize,
        source: serde_json::Error,
    },

    #[error("serialize trade: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid trade: {0}")]
    Invalid(#[from] TradeError),

    #[error("calculation failed: {0}")]
    Calc(#[from] CalcError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("trade {0} already exists")]
    Duplicate(TradeId),

    #[error("trade {0} not found")]
    NotFound(String),

    #[error("trade id prefix '{0}' matches more than one trade")]
    Ambiguous(String),
}

/// A CSV row that could not be imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based line number in the CSV file (the header is line 1).
    pub line: usize,
    pub message: String,
}

/// Outcome of a CSV import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub duplicates: usize,
    pub rejected: Vec<RowError>,
}

/// Flat CSV export row: base fields followed by derived metrics.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    date: String,
    symbol: &'a str,
    market: &'a str,
    direction: String,
    entry_price: f64,
    exit_price: Option<f64>,
    quantity: f64,
    notes: Option<&'a str>,
    investment: f64,
    profit_loss: Option<f64>,
    profit_loss_percentage: Option<f64>,
    max_runup: Option<f64>,
    max_drawdown: Option<f64>,
}

impl<'a> From<&'a Trade> for ExportRow<'a> {
    fn from(trade: &'a Trade) -> Self {
        let entry = trade.entry();
        let metrics = trade.metrics();
        Self {
            id: trade.id().as_str(),
            date: entry.date().to_string(),
            symbol: entry.symbol(),
            market: entry.market().as_str(),
            direction: entry.direction().to_string(),
            entry_price: entry.entry_price(),
            exit_price: entry.exit_price(),
            quantity: entry.quantity(),
            notes: entry.notes(),
            investment: metrics.investment,
            profit_loss: metrics.profit_loss,
            profit_loss_percentage: metrics.profit_loss_percentage,
            max_runup: metrics.max_runup,
            max_drawdown: metrics.max_drawdown,
        }
    }
}

/// JSONL-backed journal of evaluated trades, kept in insertion order.
pub struct Journal {
    path: PathBuf,
    calculator: TradeCalculator,
    trades: Vec<Trade>,
}

impl Journal {
    /// Open a journal file, re-evaluating every stored trade.
    ///
    /// A missing file is an empty journal. A line that does not parse or
    /// validate is an error; repeated trades are dropped with a warning.
    pub fn open(path: impl Into<PathBuf>, calculator: TradeCalculator) -> Result<Self, JournalError> {
        let path = path.into();
        let mut journal = Self { path, calculator, trades: Vec::new() };
        if !journal.path.exists() {
            return Ok(journal);
        }

        let reader = io::BufReader::new(File::open(&journal.path)?);
        let mut seen = HashSet::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: TradeEntry = serde_json::from_str(&line)
                .map_err(|source| JournalError::Corrupt { line: index + 1, source })?;
            let trade = journal.calculator.evaluate(entry)?;
            if !seen.insert(trade.id().clone()) {
                warn!(line = index + 1, id = %trade.id(), "skipping repeated trade in journal");
                continue;
            }
            journal.trades.push(trade);
        }

        info!(path = %journal.path.display(), trades = journal.trades.len(), "journal loaded");
        Ok(journal)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn calculator(&self) -> &TradeCalculator {
        &self.calculator
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn contains(&self, id: &TradeId) -> bool {
        self.trades.iter().any(|t| t.id() == id)
    }

    pub fn get(&self, id: &TradeId) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id() == id)
    }

    /// Resolve a full id or a unique id prefix.
    pub fn resolve(&self, prefix: &str) -> Result<TradeId, JournalError> {
        let prefix = prefix.trim();
        let mut matches = self
            .trades
            .iter()
            .filter(|t| !prefix.is_empty() && t.id().as_str().starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(trade), None) => Ok(trade.id().clone()),
            (Some(_), Some(_)) => Err(JournalError::Ambiguous(prefix.to_string())),
            (None, _) => Err(JournalError::NotFound(prefix.to_string())),
        }
    }

    /// All trades, newest date first; same-day trades most recently added first.
    pub fn trades(&self) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> = self.trades.iter().rev().collect();
        trades.sort_by(|a, b| b.entry().date().cmp(&a.entry().date()));
        trades
    }

    /// The `limit` newest trades.
    pub fn recent(&self, limit: usize) -> Vec<&Trade> {
        let mut trades = self.trades();
        trades.truncate(limit);
        trades
    }

    /// Evaluate and append an entry. Rejects an entry already in the journal.
    pub fn add(&mut self, entry: TradeEntry) -> Result<TradeId, JournalError> {
        let trade = self.calculator.evaluate(entry)?;
        if self.contains(trade.id()) {
            return Err(JournalError::Duplicate(trade.id().clone()));
        }
        self.append_lines(std::slice::from_ref(&trade))?;
        let id = trade.id().clone();
        info!(id = %id, symbol = trade.entry().symbol(), "trade added");
        self.trades.push(trade);
        Ok(id)
    }

    /// Replace the trade at `id` with a re-evaluated entry.
    ///
    /// The id follows the content, so the returned id differs from `id`
    /// whenever a field changed.
    pub fn update(&mut self, id: &TradeId, entry: TradeEntry) -> Result<TradeId, JournalError> {
        let index = self.index_of(id)?;
        let trade = self.calculator.evaluate(entry)?;
        if trade.id() != id && self.contains(trade.id()) {
            return Err(JournalError::Duplicate(trade.id().clone()));
        }
        let new_id = trade.id().clone();
        let previous = std::mem::replace(&mut self.trades[index], trade);
        if let Err(e) = self.rewrite() {
            self.trades[index] = previous;
            return Err(e);
        }
        info!(old = %id, new = %new_id, "trade updated");
        Ok(new_id)
    }

    /// Remove a trade and return it.
    pub fn delete(&mut self, id: &TradeId) -> Result<Trade, JournalError> {
        let index = self.index_of(id)?;
        let removed = self.trades.remove(index);
        if let Err(e) = self.rewrite() {
            self.trades.insert(index, removed);
            return Err(e);
        }
        info!(id = %id, "trade deleted");
        Ok(removed)
    }

    /// Import trades from CSV with a header row.
    ///
    /// Columns are matched by name (`date,symbol,market,direction,entry_price,
    /// exit_price,quantity,notes`); extra columns are ignored. Rows are
    /// evaluated in parallel. Invalid rows are reported, not fatal; trades
    /// already in the journal (or repeated in the file) are skipped.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<ImportReport, JournalError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let rows: Vec<(usize, Result<RawTrade, csv::Error>)> = csv_reader
            .deserialize::<RawTrade>()
            .enumerate()
            .map(|(index, row)| (index + 2, row))
            .collect();

        let calculator = &self.calculator;
        let evaluated: Vec<(usize, Result<Trade, JournalError>)> = rows
            .into_par_iter()
            .map(|(line, row)| {
                let result = row.map_err(JournalError::from).and_then(|raw| {
                    let entry = TradeEntry::parse(&raw)?;
                    Ok(calculator.evaluate(entry)?)
                });
                (line, result)
            })
            .collect();

        let mut report = ImportReport::default();
        let mut seen: HashSet<TradeId> = self.trades.iter().map(|t| t.id().clone()).collect();
        let mut accepted = Vec::new();
        for (line, result) in evaluated {
            match result {
                Ok(trade) if !seen.insert(trade.id().clone()) => report.duplicates += 1,
                Ok(trade) => accepted.push(trade),
                Err(e) => {
                    warn!(line, error = %e, "rejected CSV row");
                    report.rejected.push(RowError { line, message: e.to_string() });
                }
            }
        }

        self.append_lines(&accepted)?;
        report.imported = accepted.len();
        self.trades.extend(accepted);
        info!(
            imported = report.imported,
            duplicates = report.duplicates,
            rejected = report.rejected.len(),
            "CSV import finished"
        );
        Ok(report)
    }

    /// Write every trade, newest first, with derived columns. Returns the row count.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, JournalError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let trades = self.trades();
        for trade in &trades {
            csv_writer.serialize(ExportRow::from(*trade))?;
        }
        csv_writer.flush()?;
        Ok(trades.len())
    }

    fn index_of(&self, id: &TradeId) -> Result<usize, JournalError> {
        self.trades
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| JournalError::NotFound(id.to_string()))
    }

    fn append_lines(&self, trades: &[Trade]) -> Result<(), JournalError> {
        if trades.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for trade in trades {
            writeln!(writer, "{}", serde_json::to_string(trade)?)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn rewrite(&self) -> Result<(), JournalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("jsonl.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            for trade in &self.trades {
                writeln!(writer, "{}", serde_json::to_string(trade)?)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
