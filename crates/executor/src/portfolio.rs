use chrono::{DateTime, Utc};
use core_types::Position;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// The flat, persisted form of a position.
///
/// `unrealized_pnl` is derived at save time for the benefit of external
/// readers and ignored on restore; exit-plan fields and confidence are not
/// part of the persisted schema and do not survive a round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub symbol: String,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(default)]
    pub liquidation_price: Option<Decimal>,
    #[serde(default = "default_leverage")]
    pub leverage: Decimal,
    #[serde(default)]
    pub unrealized_pnl: Decimal,
    #[serde(default)]
    pub entry_time: Option<DateTime<Utc>>,
}

fn default_leverage() -> Decimal {
    Decimal::ONE
}

impl PositionRecord {
    pub fn from_position(position: &Position) -> Self {
        Self {
            symbol: position.symbol.clone(),
            quantity: position.quantity,
            entry_price: position.entry_price,
            current_price: Some(position.current_price),
            liquidation_price: position.liquidation_price,
            leverage: position.leverage,
            unrealized_pnl: position.unrealized_pnl(),
            entry_time: Some(position.entry_time),
        }
    }

    /// Rebuilds a live position from the persisted form.
    ///
    /// Missing `current_price` falls back to the entry price; a record
    /// without an `entry_time` (legacy snapshots) gets stamped now, since
    /// the field is otherwise never mutated after creation.
    pub fn into_position(self) -> Position {
        let current_price = self.current_price.unwrap_or(self.entry_price);
        Position {
            symbol: self.symbol,
            quantity: self.quantity,
            entry_price: self.entry_price,
            current_price,
            liquidation_price: self.liquidation_price,
            leverage: self.leverage,
            profit_target: None,
            stop_loss: None,
            confidence: dec!(0.5),
            entry_time: self.entry_time.unwrap_or_else(Utc::now),
        }
    }
}

/// The serializable form of the whole ledger.
///
/// The cash fields are optional on the way in so that partial or legacy
/// snapshots restore cleanly; `Portfolio::restore` resynchronises
/// `available_cash` from collateral regardless of what the snapshot says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub positions: Vec<PositionRecord>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub initial_cash: Option<Decimal>,
    #[serde(default)]
    pub available_cash: Option<Decimal>,
    #[serde(default)]
    pub total_asset: Option<Decimal>,
}

/// Manages the state of a trading account: cash, collateral, and at most one
/// position per symbol.
///
/// This is the low-level accounting primitive. `upsert` and `remove` apply
/// cash adjustments mechanically and carry no admission policy — whether a
/// trade is allowed to reach them at all is the execution engine's decision.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub initial_cash: Decimal,
    pub available_cash: Decimal,
    pub total_asset: Decimal,
    pub positions: HashMap<String, Position>,
}

impl Portfolio {
    /// Creates a new `Portfolio` with a given amount of starting cash.
    pub fn new(initial_cash: Decimal) -> Self {
        Self {
            initial_cash,
            available_cash: initial_cash,
            total_asset: initial_cash,
            positions: HashMap::new(),
        }
    }

    /// Adds or replaces the position for a symbol.
    ///
    /// Any collateral reserved for an existing position on the same symbol
    /// is returned to cash before the new position's collateral is taken.
    pub fn upsert(&mut self, position: Position) {
        let old_collateral = self
            .positions
            .get(&position.symbol)
            .map(Position::collateral)
            .unwrap_or(Decimal::ZERO);

        self.available_cash = self.available_cash + old_collateral - position.collateral();
        self.positions.insert(position.symbol.clone(), position);
        self.refresh_total_asset();
    }

    /// Removes the position for a symbol, crediting its collateral plus
    /// unrealized PnL back to cash. No-op if the symbol has no position.
    pub fn remove(&mut self, symbol: &str) {
        if let Some(position) = self.positions.remove(symbol) {
            self.available_cash += position.collateral() + position.unrealized_pnl();
        }
        self.refresh_total_asset();
    }

    /// Updates the mark price for a symbol. No-op if the symbol has no
    /// position.
    pub fn update_price(&mut self, symbol: &str, price: Decimal) {
        if let Some(position) = self.positions.get_mut(symbol) {
            position.current_price = price;
        }
        self.refresh_total_asset();
    }

    /// Applies a batch of mark prices with a single total-asset recompute.
    pub fn update_prices(&mut self, prices: &HashMap<String, Decimal>) {
        for (symbol, price) in prices {
            if let Some(position) = self.positions.get_mut(symbol) {
                position.current_price = *price;
            }
        }
        self.refresh_total_asset();
    }

    /// Sum of unrealized PnL across all open positions.
    pub fn total_pnl(&self) -> Decimal {
        self.positions.values().map(Position::unrealized_pnl).sum()
    }

    /// Captures the current ledger state in its persisted form.
    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            positions: self
                .positions
                .values()
                .map(PositionRecord::from_position)
                .collect(),
            timestamp: Utc::now(),
            initial_cash: Some(self.initial_cash),
            available_cash: Some(self.available_cash),
            total_asset: Some(self.total_asset),
        }
    }

    /// Replaces the ledger state wholesale from a snapshot.
    ///
    /// Collateral is derived, not persisted, and a snapshot's cash fields
    /// may be stale — so after loading the positions, `available_cash` is
    /// recomputed from scratch as `initial_cash - Σ collateral`.
    pub fn restore(&mut self, snapshot: PortfolioSnapshot) {
        self.initial_cash = snapshot.initial_cash.unwrap_or(self.initial_cash);
        self.available_cash = snapshot.available_cash.unwrap_or(self.initial_cash);

        self.positions.clear();
        for record in snapshot.positions {
            if record.quantity.is_zero() {
                warn!(symbol = %record.symbol, "discarding zero-quantity position from snapshot");
                continue;
            }
            let position = record.into_position();
            self.positions.insert(position.symbol.clone(), position);
        }

        self.resync_cash();
    }

    /// Recomputes `available_cash` from collateral and then `total_asset`.
    fn resync_cash(&mut self) {
        let total_collateral: Decimal = self.positions.values().map(Position::collateral).sum();
        self.available_cash = self.initial_cash - total_collateral;
        self.refresh_total_asset();
    }

    /// `total_asset = available_cash + Σ (collateral + unrealized_pnl)`.
    fn refresh_total_asset(&mut self) {
        let position_value: Decimal = self
            .positions
            .values()
            .map(|p| p.collateral() + p.unrealized_pnl())
            .sum();
        self.total_asset = self.available_cash + position_value;
    }
}
