//! Domain types for TradeLab

pub mod ids;
pub mod instrument;
pub mod market;
pub mod trade;

pub use ids::TradeId;
pub use instrument::{TickSpec, TickTable, TickTableError};
pub use market::{Direction, Market};
pub use trade::{RawTrade, Trade, TradeEntry, TradeError, TradeFields, TradeMetrics};
