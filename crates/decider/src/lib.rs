//! # Meridian Decider Crate
//!
//! The decision-provider collaborator. A `Decider` looks at the per-symbol
//! market context and the current account report and proposes trades; the
//! execution engine treats every proposal as untrusted input and re-validates
//! it before touching the ledger.
//!
//! ## Architectural Principles
//!
//! - **Pure policy:** a decider reads context and emits `TradeProposal`s.
//!   It never mutates the portfolio and never performs I/O of its own.
//! - **Untrusted boundary:** proposals arriving as JSON from an external
//!   provider go through `parse_proposals`, which drops a malformed entry
//!   without failing the rest of the batch.
//!
//! ## Public API
//!
//! - `Decider`: the core trait all decision providers implement.
//! - `MomentumDecider`: the built-in rule-based provider.
//! - `parse_proposals`: tolerant parsing of an external provider's output.
//! - `DeciderError`: the specific error types this crate can return.

use core_types::{MarketSnapshot, TradeProposal};
use executor::PortfolioReport;
use std::collections::HashMap;

pub mod error;
pub mod momentum;
pub mod proposals;

// Re-export the key components to provide a clean, public-facing API.
pub use error::DeciderError;
pub use momentum::MomentumDecider;
pub use proposals::parse_proposals;

/// The core trait all decision providers implement.
///
/// The `&mut self` allows implementations to keep internal state between
/// ticks (e.g., previous indicator readings); the `Send + Sync` bounds let a
/// decider live behind a trait object in the run loop.
pub trait Decider: Send + Sync {
    /// Proposes zero or more trades from the current market context and
    /// account report. One proposal per symbol at most.
    fn decide(
        &mut self,
        market: &HashMap<String, MarketSnapshot>,
        report: &PortfolioReport,
    ) -> Result<Vec<TradeProposal>, DeciderError>;
}
