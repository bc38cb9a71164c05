pub mod enums;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Action, Side, Signal};
pub use structs::{Execution, Kline, MarketSnapshot, OrderRequest, Position, TradeProposal};
