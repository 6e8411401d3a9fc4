//! Journal trade types: raw input → validated entry → evaluated trade.
//!
//! `TradeEntry` holds only base fields and can only be built through
//! validation. `Trade` pairs an entry with the metrics derived from it and is
//! only produced by the calculator, so derived values never drift from the
//! entry they were computed for.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::TradeId;
use super::market::{Direction, Market};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' is not a valid number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field '{field}' must be greater than zero, got {value}")]
    NonPositivePrice { field: &'static str, value: f64 },

    #[error("quantity must be non-zero")]
    ZeroQuantity,

    #[error("direction must be Long or Short, got '{0}'")]
    InvalidDirection(String),

    #[error("invalid date '{0}' (expected YYYY-MM-DD or an RFC 3339 datetime)")]
    InvalidDate(String),
}

/// Untyped trade input as it arrives from a CSV row, form, or command line.
///
/// Every field is text; a blank `exit_price` means the position is still open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTrade {
    pub date: String,
    pub symbol: String,
    pub market: String,
    pub direction: String,
    pub entry_price: String,
    pub exit_price: String,
    pub quantity: String,
    pub notes: String,
}

/// Typed base fields, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeFields {
    pub date: NaiveDate,
    pub symbol: String,
    pub market: Market,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub quantity: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A validated, normalized trade entry (base fields only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TradeFields")]
pub struct TradeEntry {
    date: NaiveDate,
    symbol: String,
    market: Market,
    direction: Direction,
    entry_price: f64,
    exit_price: Option<f64>,
    quantity: f64,
    notes: Option<String>,
}

impl TradeEntry {
    /// Validate and normalize typed fields.
    ///
    /// Symbols are trimmed and uppercased, blank notes dropped. Prices must be
    /// finite and positive; quantity must be finite and non-zero (its sign is
    /// kept but only the magnitude is used in calculations).
    pub fn new(fields: TradeFields) -> Result<Self, TradeError> {
        let symbol = fields.symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(TradeError::MissingField("symbol"));
        }
        if fields.market.as_str().trim().is_empty() {
            return Err(TradeError::MissingField("market"));
        }
        let entry_price = positive_price("entry_price", fields.entry_price)?;
        let exit_price = fields
            .exit_price
            .map(|price| positive_price("exit_price", price))
            .transpose()?;
        if !fields.quantity.is_finite() {
            return Err(TradeError::InvalidNumber {
                field: "quantity",
                value: fields.quantity.to_string(),
            });
        }
        if fields.quantity == 0.0 {
            return Err(TradeError::ZeroQuantity);
        }
        let notes = fields
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Self {
            date: fields.date,
            symbol,
            market: fields.market,
            direction: fields.direction,
            entry_price,
            exit_price,
            quantity: fields.quantity,
            notes,
        })
    }

    /// Parse untyped input, then validate.
    pub fn parse(raw: &RawTrade) -> Result<Self, TradeError> {
        let market = raw.market.trim();
        if market.is_empty() {
            return Err(TradeError::MissingField("market"));
        }
        if raw.direction.trim().is_empty() {
            return Err(TradeError::MissingField("direction"));
        }
        let exit_price = if raw.exit_price.trim().is_empty() {
            None
        } else {
            Some(parse_number("exit_price", &raw.exit_price)?)
        };

        Self::new(TradeFields {
            date: parse_date(&raw.date)?,
            symbol: raw.symbol.clone(),
            market: Market::parse(market),
            direction: raw.direction.parse()?,
            entry_price: parse_number("entry_price", &raw.entry_price)?,
            exit_price,
            quantity: parse_number("quantity", &raw.quantity)?,
            notes: Some(raw.notes.clone()),
        })
    }

    /// Release the base fields for editing; rebuild with `TradeEntry::new`.
    pub fn into_fields(self) -> TradeFields {
        TradeFields {
            date: self.date,
            symbol: self.symbol,
            market: self.market,
            direction: self.direction,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            quantity: self.quantity,
            notes: self.notes,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn exit_price(&self) -> Option<f64> {
        self.exit_price
    }

    /// Signed quantity as entered.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Quantity magnitude used by every calculation.
    pub fn size(&self) -> f64 {
        self.quantity.abs()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.exit_price.is_none()
    }
}

impl TryFrom<TradeFields> for TradeEntry {
    type Error = TradeError;

    fn try_from(fields: TradeFields) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

fn positive_price(field: &'static str, value: f64) -> Result<f64, TradeError> {
    if !value.is_finite() {
        return Err(TradeError::InvalidNumber { field, value: value.to_string() });
    }
    if value <= 0.0 {
        return Err(TradeError::NonPositivePrice { field, value });
    }
    Ok(value)
}

fn parse_number(field: &'static str, text: &str) -> Result<f64, TradeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TradeError::MissingField(field));
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TradeError::InvalidNumber { field, value: text.to_string() }),
    }
}

/// Calendar day of a date or datetime; time of day is discarded.
///
/// Datetimes carrying an offset are converted to the local calendar day
/// first, so `2024-03-05T23:30:00-05:00` lands on the local date of that instant.
fn parse_date(text: &str) -> Result<NaiveDate, TradeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TradeError::MissingField("date"));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Local).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| TradeError::InvalidDate(text.to_string()))
}

/// Values derived from a trade entry.
///
/// `investment` is always present. The P&L, percentage and excursion fields
/// are `None` while the position is open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeMetrics {
    pub investment: f64,
    pub profit_loss: Option<f64>,
    pub profit_loss_percentage: Option<f64>,
    pub max_runup: Option<f64>,
    pub max_drawdown: Option<f64>,
}

/// An evaluated journal trade: entry plus the metrics computed from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    id: TradeId,
    #[serde(flatten)]
    entry: TradeEntry,
    #[serde(flatten)]
    metrics: TradeMetrics,
}

impl Trade {
    pub(crate) fn new(entry: TradeEntry, metrics: TradeMetrics) -> Self {
        Self { id: TradeId::for_entry(&entry), entry, metrics }
    }

    pub fn id(&self) -> &TradeId {
        &self.id
    }

    pub fn entry(&self) -> &TradeEntry {
        &self.entry
    }

    pub fn metrics(&self) -> &TradeMetrics {
        &self.metrics
    }

    pub fn profit_loss(&self) -> Option<f64> {
        self.metrics.profit_loss
    }

    pub fn is_open(&self) -> bool {
        self.entry.is_open()
    }

    pub fn is_winner(&self) -> bool {
        self.metrics.profit_loss.is_some_and(|pnl| pnl > 0.0)
    }

    pub fn is_loser(&self) -> bool {
        self.metrics.profit_loss.is_some_and(|pnl| pnl < 0.0)
    }

    /// Drop the metrics and recover the entry, e.g. to edit it.
    pub fn into_entry(self) -> TradeEntry {
        self.entry
    }
}
