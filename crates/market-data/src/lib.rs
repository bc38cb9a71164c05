//! # Meridian Market Data Crate
//!
//! The market-data collaborator: everything the tracker knows about the
//! outside market arrives through the `MarketDataProvider` trait defined
//! here. The core never talks to an exchange; it consumes prices and
//! indicator context and is agnostic about where they came from.
//!
//! ## Public API
//!
//! - `MarketDataProvider`: the abstract provider interface.
//! - `ReplayProvider`: a deterministic provider over in-memory candle
//!   series, advanced one bar per tick. Powers tests and simulated runs.
//! - `synthetic_klines`: a deterministic candle generator for seeding a
//!   `ReplayProvider` without any network or randomness.
//! - `MarketDataError`: the specific error types a provider can return.

use async_trait::async_trait;
use core_types::MarketSnapshot;
use rust_decimal::Decimal;

pub mod error;
mod indicators;
pub mod replay;
pub mod synthetic;

// --- Public API ---
pub use error::MarketDataError;
pub use replay::ReplayProvider;
pub use synthetic::synthetic_klines;

/// The generic, abstract interface for a market-data source.
///
/// Absence of data is a normal condition, not an error: a provider that has
/// nothing for a symbol yet returns `Ok(None)` and the caller skips that
/// symbol for the tick.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// The latest traded price for a symbol, or `None` when the provider
    /// has no data for it.
    async fn last_price(&self, symbol: &str) -> Result<Option<Decimal>, MarketDataError>;

    /// Indicator context for a symbol, carrying the latest readings and
    /// `count` trailing bars of history at the given interval, or `None`
    /// when no candles are available.
    async fn market_snapshot(
        &self,
        symbol: &str,
        interval: &str,
        count: usize,
    ) -> Result<Option<MarketSnapshot>, MarketDataError>;
}
