//! Journal statistics — pure functions over closed-trade P&L.
//!
//! Open trades are counted but contribute nothing else. Streaks and the P&L
//! drawdown are measured in chronological order (by trade date, ties in
//! input order).

use serde::{Deserialize, Serialize};

use crate::calculator::round_cents;
use crate::domain::Trade;

/// Aggregate statistics for a set of journal trades.
///
/// Dollar amounts are rounded to cents. `gross_loss` is a positive magnitude;
/// `average_loss`, `largest_loss` and `max_pnl_drawdown` are non-positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalStats {
    pub total_trades: usize,
    pub open_trades: usize,
    pub closed_trades: usize,
    pub winners: usize,
    pub losers: usize,
    pub breakeven: usize,
    /// Fraction of closed trades that were winners.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// Investment of closed trades only.
    pub total_investment: f64,
    /// Total P&L as a percentage of `total_investment`.
    pub return_on_investment: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    /// Largest peak-to-trough drop of cumulative P&L.
    pub max_pnl_drawdown: f64,
}

impl JournalStats {
    /// Compute statistics for any collection of trades; order does not matter.
    pub fn compute<'a, I>(trades: I) -> Self
    where
        I: IntoIterator<Item = &'a Trade>,
    {
        let mut trades: Vec<&Trade> = trades.into_iter().collect();
        trades.sort_by_key(|t| t.entry().date());

        let total_trades = trades.len();
        let closed: Vec<&Trade> = trades.iter().copied().filter(|t| !t.is_open()).collect();
        let pnls: Vec<f64> = closed.iter().filter_map(|t| t.profit_loss()).collect();

        let winners = pnls.iter().filter(|&&p| p > 0.0).count();
        let losers = pnls.iter().filter(|&&p| p < 0.0).count();
        let gross_profit = gross_profit(&pnls);
        let gross_loss = gross_loss(&pnls);
        let total_pnl = round_cents(pnls.iter().sum());
        let total_investment = round_cents(closed.iter().map(|t| t.metrics().investment).sum());

        Self {
            total_trades,
            open_trades: total_trades - closed.len(),
            closed_trades: closed.len(),
            winners,
            losers,
            breakeven: pnls.len() - winners - losers,
            win_rate: win_rate(&pnls),
            total_pnl,
            gross_profit: round_cents(gross_profit),
            gross_loss: round_cents(gross_loss),
            profit_factor: profit_factor(&pnls),
            average_win: average(winners, gross_profit),
            average_loss: average(losers, -gross_loss),
            largest_win: round_cents(pnls.iter().copied().fold(0.0, f64::max)),
            largest_loss: round_cents(pnls.iter().copied().fold(0.0, f64::min)),
            total_investment,
            return_on_investment: if total_investment > 0.0 {
                round_cents(total_pnl / total_investment * 100.0)
            } else {
                0.0
            },
            max_consecutive_wins: max_consecutive(&pnls, true),
            max_consecutive_losses: max_consecutive(&pnls, false),
            max_pnl_drawdown: max_pnl_drawdown(&pnls),
        }
    }
}

fn average(count: usize, total: f64) -> f64 {
    if count == 0 {
        0.0
    } else {
        round_cents(total / count as f64)
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn gross_profit(pnls: &[f64]) -> f64 {
    pnls.iter().filter(|&&p| p > 0.0).sum()
}

/// Sum of losing P&L as a positive magnitude.
pub fn gross_loss(pnls: &[f64]) -> f64 {
    pnls.iter().filter(|&&p| p < 0.0).map(|p| p.abs()).sum()
}

/// Win rate: fraction of trades that were winners.
pub fn win_rate(pnls: &[f64]) -> f64 {
    if pnls.is_empty() {
        return 0.0;
    }
    let winners = pnls.iter().filter(|&&p| p > 0.0).count();
    winners as f64 / pnls.len() as f64
}

/// Profit factor: gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(pnls: &[f64]) -> f64 {
    if pnls.is_empty() {
        return 0.0;
    }
    let gross_profit = gross_profit(pnls);
    let gross_loss = gross_loss(pnls);

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Longest run of winners (`winners = true`) or losers. Breakeven trades end
/// either kind of run.
pub fn max_consecutive(pnls: &[f64], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;
    for &pnl in pnls {
        let counts = if winners { pnl > 0.0 } else { pnl < 0.0 };
        if counts {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}

/// Largest peak-to-trough drop of the cumulative P&L curve, starting from zero.
pub fn max_pnl_drawdown(pnls: &[f64]) -> f64 {
    let mut cumulative = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for &pnl in pnls {
        cumulative += pnl;
        peak = peak.max(cumulative);
        max_dd = max_dd.min(cumulative - peak);
    }
    round_cents(max_dd)
}
