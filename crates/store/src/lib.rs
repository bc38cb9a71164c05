//! # Meridian Store Crate
//!
//! File-based snapshot persistence for the portfolio ledger. The store is
//! the system's only durable surface: a single pretty-printed JSON document
//! holding the positions in their flat persisted form plus the cash totals.
//!
//! A missing or unreadable snapshot is reported to the caller, who decides
//! whether to start from a fresh ledger (the usual choice) or abort; the
//! store itself never makes that call.
//!
//! ## Public API
//!
//! - `SnapshotStore`: save/load of `PortfolioSnapshot` documents.
//! - `StoreError`: the specific error types that can be returned.

// Declare the modules that constitute this crate.
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use error::StoreError;
pub use repository::SnapshotStore;
