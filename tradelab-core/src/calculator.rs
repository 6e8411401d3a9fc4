//! Trade calculator — investment, P&L, return percentage and excursion.
//!
//! Every operation is a pure function of a trade entry and, for futures, the
//! injected tick table. `TradeCalculator::evaluate` runs them all and bundles
//! the result into a `Trade`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{TickSpec, TickTable, Trade, TradeEntry, TradeMetrics};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("entry price must be greater than zero, got {0}")]
    NonPositiveEntryPrice(f64),

    #[error("quantity must be a finite number, got {0}")]
    NonFiniteQuantity(f64),

    #[error("investment is zero; return percentage is undefined")]
    ZeroInvestment,

    #[error("investment overflows: {entry_price} x {quantity}")]
    InvestmentOverflow { entry_price: f64, quantity: f64 },
}

/// Best and worst unrealized move implied by entry vs. exit.
///
/// With only two price points the whole net move is one excursion, so at most
/// one of the pair is non-zero. `max_drawdown` is reported as a non-positive
/// dollar amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Excursion {
    pub max_runup: f64,
    pub max_drawdown: f64,
}

/// Which P&L algorithm applies to an entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PnlPath {
    /// Futures contract found in the tick table; P&L is quantized to whole ticks.
    Futures(TickSpec),
    /// Dollar-per-unit price difference.
    Generic,
}

/// Round to cents. Negative zero is normalized to zero.
pub fn round_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `entry_price × |quantity|`, rounded to cents.
pub fn compute_investment(entry_price: f64, quantity: f64) -> Result<f64, CalcError> {
    if !(entry_price.is_finite() && entry_price > 0.0) {
        return Err(CalcError::NonPositiveEntryPrice(entry_price));
    }
    if !quantity.is_finite() {
        return Err(CalcError::NonFiniteQuantity(quantity));
    }
    let investment = entry_price * quantity.abs();
    if !investment.is_finite() {
        return Err(CalcError::InvestmentOverflow { entry_price, quantity });
    }
    Ok(round_cents(investment))
}

/// Select the P&L algorithm: futures path only when the market is futures and
/// the symbol resolves in the tick table.
pub fn pnl_path(entry: &TradeEntry, ticks: &TickTable) -> PnlPath {
    if !entry.market().is_futures() {
        return PnlPath::Generic;
    }
    match ticks.get(entry.symbol()) {
        Some(spec) => PnlPath::Futures(*spec),
        None => PnlPath::Generic,
    }
}

/// Realized P&L in dollars, or `None` while the position is open.
pub fn compute_profit_loss(entry: &TradeEntry, ticks: &TickTable) -> Option<f64> {
    let exit_price = entry.exit_price()?;
    let price_move = entry.direction().favorable_move(entry.entry_price(), exit_price);

    let pnl = match pnl_path(entry, ticks) {
        PnlPath::Futures(spec) => spec.value_of(price_move, entry.size()),
        PnlPath::Generic => price_move * entry.size(),
    };
    Some(round_cents(pnl))
}

/// `profit_loss / investment × 100`, rounded to two decimals.
pub fn compute_profit_loss_percentage(profit_loss: f64, investment: f64) -> Result<f64, CalcError> {
    if investment == 0.0 || !investment.is_finite() {
        return Err(CalcError::ZeroInvestment);
    }
    Ok(round_cents(profit_loss / investment * 100.0))
}

/// Runup/drawdown from the net entry→exit move, or `None` while open.
pub fn compute_excursion(entry: &TradeEntry) -> Option<Excursion> {
    let exit_price = entry.exit_price()?;
    let favorable = entry.direction().favorable_move(entry.entry_price(), exit_price);
    let dollars = favorable * entry.size();

    let excursion = if favorable > 0.0 {
        Excursion { max_runup: round_cents(dollars), max_drawdown: 0.0 }
    } else {
        Excursion { max_runup: 0.0, max_drawdown: round_cents(dollars) }
    };
    Some(excursion)
}

/// Evaluates trade entries against a tick table.
#[derive(Debug, Clone)]
pub struct TradeCalculator {
    ticks: TickTable,
}

impl TradeCalculator {
    pub fn new(ticks: TickTable) -> Self {
        Self { ticks }
    }

    /// Calculator over the built-in futures tick table.
    pub fn with_default_ticks() -> Self {
        Self::new(TickTable::with_defaults())
    }

    pub fn ticks(&self) -> &TickTable {
        &self.ticks
    }

    /// Derive all metrics for an entry.
    ///
    /// A position worth less than a cent has zero investment; its percentage
    /// is left unset while every other metric is still reported.
    pub fn metrics(&self, entry: &TradeEntry) -> Result<TradeMetrics, CalcError> {
        let investment = compute_investment(entry.entry_price(), entry.quantity())?;
        let profit_loss = compute_profit_loss(entry, &self.ticks);
        let profit_loss_percentage = match profit_loss {
            Some(pnl) if investment != 0.0 => Some(compute_profit_loss_percentage(pnl, investment)?),
            _ => None,
        };
        let excursion = compute_excursion(entry);

        Ok(TradeMetrics {
            investment,
            profit_loss,
            profit_loss_percentage,
            max_runup: excursion.map(|e| e.max_runup),
            max_drawdown: excursion.map(|e| e.max_drawdown),
        })
    }

    /// Evaluate an entry into a journal trade.
    pub fn evaluate(&self, entry: TradeEntry) -> Result<Trade, CalcError> {
        let metrics = self.metrics(&entry)?;
        let path = match pnl_path(&entry, &self.ticks) {
            PnlPath::Futures(_) => "futures",
            PnlPath::Generic => "generic",
        };
        debug!(
            symbol = entry.symbol(),
            market = %entry.market(),
            path,
            profit_loss = ?metrics.profit_loss,
            "evaluated trade"
        );
        Ok(Trade::new(entry, metrics))
    }
}
