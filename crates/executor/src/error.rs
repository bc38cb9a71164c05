use core_types::Side;
use rust_decimal::Decimal;
use thiserror::Error;

/// Why a proposed trade was not admitted.
///
/// Every validation failure and every no-op branch of the execution state
/// machine maps to one of these values. They are returned, not raised: the
/// caller branches on them, logs them, and moves on to the next proposal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("Order price must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("Leverage must be positive, got {0}")]
    InvalidLeverage(Decimal),

    #[error("Quantity must be non-zero for a buy/sell order on {0}")]
    ZeroQuantity(String),

    #[error("Not enough cash available to reserve collateral. Required: {required}, Available: {available}")]
    InsufficientCash { required: Decimal, available: Decimal },

    #[error("A {side} position already exists for {symbol}")]
    SameDirectionExists { symbol: String, side: Side },

    #[error("No open position to close for {0}")]
    NoPositionToClose(String),

    #[error("Nothing to do for {0}")]
    NothingToDo(String),
}
