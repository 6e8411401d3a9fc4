use serde::{Deserialize, Serialize};
use std::fmt;

use super::trade::TradeEntry;

/// Hex characters kept from the content hash.
const ID_LEN: usize = 16;

/// Deterministic trade ID (content hash of the normalized entry).
///
/// Identical entries hash to the same ID, which is how the journal detects
/// duplicate inserts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TradeId(pub String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Hash an entry's base fields.
    /// Uses BLAKE3 for stable hashing across builds/platforms
    pub fn for_entry(entry: &TradeEntry) -> Self {
        use serde_json::json;

        // Canonical serialization (sorted keys)
        let canonical = json!({
            "date": entry.date().to_string(),
            "direction": entry.direction().to_string(),
            "entry_price": entry.entry_price(),
            "exit_price": entry.exit_price(),
            "market": entry.market().as_str(),
            "notes": entry.notes(),
            "quantity": entry.quantity(),
            "symbol": entry.symbol(),
        });

        let hash = blake3::hash(canonical.to_string().as_bytes());
        let hex = hash.to_hex();
        Self(hex.as_str()[..ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}
