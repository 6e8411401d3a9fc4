use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Futures contract month codes (Jan..Dec).
const MONTH_CODES: [char; 12] = ['F', 'G', 'H', 'J', 'K', 'M', 'N', 'Q', 'U', 'V', 'X', 'Z'];

/// Minimum price increment of a futures contract and the dollar value of one
/// increment per contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TickSpec {
    pub tick_size: f64,
    pub tick_value: f64,
}

impl TickSpec {
    pub fn new(tick_size: f64, tick_value: f64) -> Result<Self, TickTableError> {
        let spec = Self { tick_size, tick_value };
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> Result<(), TickTableError> {
        if !(self.tick_size.is_finite() && self.tick_size > 0.0) {
            return Err(TickTableError::InvalidTickSize(self.tick_size));
        }
        if !(self.tick_value.is_finite() && self.tick_value > 0.0) {
            return Err(TickTableError::InvalidTickValue(self.tick_value));
        }
        Ok(())
    }

    /// Whole ticks in a price move, rounded to the nearest tick (half away from zero).
    pub fn ticks_in(&self, price_move: f64) -> f64 {
        (price_move / self.tick_size).round()
    }

    /// Dollar value of a price move for `contracts` contracts, quantized to whole ticks.
    pub fn value_of(&self, price_move: f64, contracts: f64) -> f64 {
        self.ticks_in(price_move) * self.tick_value * contracts
    }
}

/// Futures root symbol → tick spec lookup.
///
/// Keys are stored uppercase. Lookups accept either the bare root (`ES`) or a
/// dated/continuous contract symbol (`ESZ4`, `ESZ24`, `ES1!`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickTable {
    specs: BTreeMap<String, TickSpec>,
}

impl TickTable {
    /// An empty table; every trade takes the generic P&L path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in table of common US futures contracts.
    pub fn with_defaults() -> Self {
        let specs = DEFAULT_SPECS
            .iter()
            .map(|&(root, tick_size, tick_value)| {
                (root.to_string(), TickSpec { tick_size, tick_value })
            })
            .collect();
        Self { specs }
    }

    /// Insert or replace a spec. Rejects non-positive tick size or value.
    pub fn insert(&mut self, root: &str, spec: TickSpec) -> Result<(), TickTableError> {
        let key = root.trim().to_ascii_uppercase();
        if key.is_empty() {
            return Err(TickTableError::EmptySymbol);
        }
        spec.validate()?;
        self.specs.insert(key, spec);
        Ok(())
    }

    /// Look up by exact symbol first, then by contract root.
    pub fn get(&self, symbol: &str) -> Option<&TickSpec> {
        let symbol = symbol.trim().to_ascii_uppercase();
        self.specs
            .get(&symbol)
            .or_else(|| contract_root(&symbol).and_then(|root| self.specs.get(root)))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TickSpec)> {
        self.specs.iter().map(|(root, spec)| (root.as_str(), spec))
    }
}

/// Strip a contract-month suffix: `ESZ4`/`ESZ24` → `ES`, `ES1!` → `ES`.
fn contract_root(symbol: &str) -> Option<&str> {
    if let Some(continuous) = symbol.strip_suffix('!') {
        let root = continuous.trim_end_matches(|c: char| c.is_ascii_digit());
        return (!root.is_empty() && root.len() < continuous.len()).then_some(root);
    }

    let without_year = symbol.trim_end_matches(|c: char| c.is_ascii_digit());
    let year_digits = symbol.len() - without_year.len();
    if !(1..=2).contains(&year_digits) {
        return None;
    }
    let month = without_year.chars().last()?;
    if !MONTH_CODES.contains(&month) {
        return None;
    }
    let root = &without_year[..without_year.len() - 1];
    (!root.is_empty()).then_some(root)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickTableError {
    #[error("tick size must be a positive number, got {0}")]
    InvalidTickSize(f64),

    #[error("tick value must be a positive number, got {0}")]
    InvalidTickValue(f64),

    #[error("tick table symbol must not be empty")]
    EmptySymbol,
}

/// (root, tick size, tick value in USD per contract)
const DEFAULT_SPECS: &[(&str, f64, f64)] = &[
    // Equity index
    ("ES", 0.25, 12.50),
    ("MES", 0.25, 1.25),
    ("NQ", 0.25, 5.00),
    ("MNQ", 0.25, 0.50),
    ("YM", 1.0, 5.00),
    ("MYM", 1.0, 0.50),
    ("RTY", 0.10, 5.00),
    ("M2K", 0.10, 0.50),
    // Energy
    ("CL", 0.01, 10.00),
    ("MCL", 0.01, 1.00),
    ("NG", 0.001, 10.00),
    ("RB", 0.0001, 4.20),
    ("HO", 0.0001, 4.20),
    // Metals
    ("GC", 0.10, 10.00),
    ("MGC", 0.10, 1.00),
    ("SI", 0.005, 25.00),
    ("SIL", 0.005, 5.00),
    ("HG", 0.0005, 12.50),
    // Interest rates
    ("ZB", 0.03125, 31.25),
    ("UB", 0.03125, 31.25),
    ("ZN", 0.015625, 15.625),
    ("ZF", 0.0078125, 7.8125),
    ("ZT", 0.00390625, 7.8125),
    // Grains
    ("ZC", 0.25, 12.50),
    ("ZS", 0.25, 12.50),
    ("ZW", 0.25, 12.50),
    ("ZL", 0.01, 6.00),
    ("ZM", 0.10, 10.00),
    // Livestock
    ("LE", 0.025, 10.00),
    ("HE", 0.025, 10.00),
    // Currencies
    ("6E", 0.00005, 6.25),
    ("6J", 0.0000005, 6.25),
    ("6B", 0.0001, 6.25),
    ("6A", 0.00005, 5.00),
    ("6C", 0.00005, 5.00),
    ("6S", 0.00005, 6.25),
    // Crypto
    ("BTC", 5.0, 25.00),
    ("MBT", 5.0, 0.50),
    ("ETH", 0.50, 25.00),
];
