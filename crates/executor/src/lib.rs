//! # Meridian Executor Crate
//!
//! This crate provides the accounting and order-execution core: the
//! `Portfolio` ledger that tracks at most one position per symbol alongside
//! cash and collateral, and the execution state machine that decides whether
//! a proposed trade is admitted, rejected, reversed, or closed.
//!
//! ## Architectural Principles
//!
//! - **State vs. Policy Decoupling:** `Portfolio` is the low-level state
//!   manager. Its `upsert`/`remove` primitives apply cash adjustments without
//!   any admission logic. All policy — validation, the one-position-per-symbol
//!   rule, sufficient-collateral checks — lives in `engine::execute_order`.
//! - **No Exceptional Control Flow:** every outcome of an execution call is
//!   an explicit value: an `Execution` receipt when admitted, a `Rejection`
//!   tag when not. Rejections never mutate the ledger.
//! - **Single Writer:** one control loop owns a `Portfolio` exclusively for
//!   its lifetime; nothing in this crate suspends or locks.
//!
//! ## Public API
//!
//! - `Portfolio`: the in-memory cash/collateral ledger.
//! - `execute_order`: the execution-engine entry point.
//! - `PortfolioSnapshot` / `PositionRecord`: the persisted snapshot forms.
//! - `PortfolioReport` / `PositionReport`: the rich presentation forms.
//! - `Rejection`: the specific rejection reasons this crate can return.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod portfolio;
pub mod report;

// Re-export the key components to provide a clean, public-facing API.
pub use engine::execute_order;
pub use error::Rejection;
pub use portfolio::{Portfolio, PortfolioSnapshot, PositionRecord};
pub use report::{ExitPlan, PortfolioReport, PositionReport};
