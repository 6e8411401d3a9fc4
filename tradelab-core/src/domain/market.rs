//! Market and direction classification for journal entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::trade::TradeError;

/// Market a trade was placed in.
///
/// Parsing never fails: unrecognized names are kept as `Other` with
/// normalized capitalization and take the generic P&L path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Market {
    Stocks,
    Options,
    Futures,
    Forex,
    Crypto,
    Other(String),
}

impl Market {
    /// Case-insensitive parse with common singular aliases.
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "stocks" | "stock" | "equity" | "equities" => Self::Stocks,
            "options" | "option" => Self::Options,
            "futures" | "future" => Self::Futures,
            "forex" | "fx" => Self::Forex,
            "crypto" | "cryptocurrency" => Self::Crypto,
            _ => Self::Other(capitalize(trimmed)),
        }
    }

    pub fn is_futures(&self) -> bool {
        matches!(self, Self::Futures)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Stocks => "Stocks",
            Self::Options => "Options",
            Self::Futures => "Futures",
            Self::Forex => "Forex",
            Self::Crypto => "Crypto",
            Self::Other(name) => name,
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<String> for Market {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<Market> for String {
    fn from(market: Market) -> Self {
        market.as_str().to_string()
    }
}

/// Trade direction. Anything other than long or short is rejected.
///
/// Deserialization goes through `FromStr`, so stored records are read
/// case-insensitively like any other input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Signed price move that counts as profit for this direction.
    pub fn favorable_move(self, entry_price: f64, exit_price: f64) -> f64 {
        match self {
            Self::Long => exit_price - entry_price,
            Self::Short => entry_price - exit_price,
        }
    }
}

impl FromStr for Direction {
    type Err = TradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            _ => Err(TradeError::InvalidDirection(s.trim().to_string())),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = TradeError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        direction.to_string()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => f.pad("Long"),
            Self::Short => f.pad("Short"),
        }
    }
}
