//! TOML configuration: journal location and futures tick-table overrides.
//!
//! ```toml
//! [journal]
//! path = "journal.jsonl"
//! recent_limit = 10
//!
//! [ticks]
//! use_defaults = true
//!
//! [ticks.overrides]
//! ES = { tick_size = 0.25, tick_value = 12.5 }
//! ```
//!
//! Every key is optional; a missing file yields the defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calculator::TradeCalculator;
use crate::domain::{TickSpec, TickTable, TickTableError};

pub const DEFAULT_JOURNAL_PATH: &str = "journal.jsonl";
pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("tick override for '{symbol}': {source}")]
    TickOverride {
        symbol: String,
        source: TickTableError,
    },

    #[error("journal.recent_limit must be at least 1")]
    InvalidRecentLimit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub journal: JournalConfig,
    pub ticks: TicksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JournalConfig {
    pub path: PathBuf,
    /// Rows shown by `recent` when no limit is given.
    pub recent_limit: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_JOURNAL_PATH),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TicksConfig {
    /// Start from the built-in futures table (otherwise only `overrides`).
    pub use_defaults: bool,
    pub overrides: BTreeMap<String, TickSpec>,
}

impl Default for TicksConfig {
    fn default() -> Self {
        Self { use_defaults: true, overrides: BTreeMap::new() }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
    }

    /// Like `from_file`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        if config.journal.recent_limit == 0 {
            return Err(ConfigError::InvalidRecentLimit);
        }
        config.tick_table()?;
        Ok(config)
    }

    /// Effective tick table: defaults (if enabled) with overrides applied.
    pub fn tick_table(&self) -> Result<TickTable, ConfigError> {
        let mut table =
            if self.ticks.use_defaults { TickTable::with_defaults() } else { TickTable::empty() };
        for (symbol, spec) in &self.ticks.overrides {
            table
                .insert(symbol, *spec)
                .map_err(|source| ConfigError::TickOverride { symbol: symbol.clone(), source })?;
        }
        Ok(table)
    }

    pub fn calculator(&self) -> Result<TradeCalculator, ConfigError> {
        Ok(TradeCalculator::new(self.tick_table()?))
    }
}
