use crate::enums::{Action, Side, Signal};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single OHLCV candlestick bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: DateTime<Utc>,
}

/// One open exposure in exactly one symbol.
///
/// The stored fields are fixed at open time except `current_price`, which the
/// price feed moves. Everything else (PnL, collateral, notional, risk) is
/// derived on demand so the stored state can never drift out of sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    /// Signed size: positive = long, negative = short.
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    /// Present only when leverage > 1.
    pub liquidation_price: Option<Decimal>,
    pub leverage: Decimal,
    pub profit_target: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub confidence: Decimal,
    pub entry_time: DateTime<Utc>,
}

impl Position {
    /// Creates a freshly opened position at `entry_price`.
    ///
    /// The liquidation price is `entry_price * (1 - 1/leverage)` for any
    /// leverage above 1, applied identically to longs and shorts. This
    /// matches the accounting convention the rest of the ledger is built
    /// around and is computed exactly once, here.
    pub fn open(
        symbol: impl Into<String>,
        quantity: Decimal,
        entry_price: Decimal,
        leverage: Decimal,
        profit_target: Option<Decimal>,
        stop_loss: Option<Decimal>,
        confidence: Decimal,
    ) -> Self {
        let liquidation_price = if leverage > Decimal::ONE {
            Some(entry_price * (Decimal::ONE - Decimal::ONE / leverage))
        } else {
            None
        };

        Self {
            symbol: symbol.into(),
            quantity,
            entry_price,
            current_price: entry_price,
            liquidation_price,
            leverage,
            profit_target,
            stop_loss,
            confidence,
            entry_time: Utc::now(),
        }
    }

    /// The direction encoded by the sign of `quantity`.
    pub fn side(&self) -> Side {
        if self.quantity.is_sign_negative() {
            Side::Short
        } else {
            Side::Long
        }
    }

    /// Leveraged mark-to-market PnL against the entry price.
    pub fn unrealized_pnl(&self) -> Decimal {
        let direction = match self.side() {
            Side::Long => Decimal::ONE,
            Side::Short => Decimal::NEGATIVE_ONE,
        };
        (self.current_price - self.entry_price) * self.quantity.abs() * self.leverage * direction
    }

    /// Cash reserved against this position: `|quantity| * entry / leverage`.
    pub fn collateral(&self) -> Decimal {
        self.quantity.abs() * self.entry_price / self.leverage
    }

    /// Current notional value in quote currency.
    pub fn notional_usd(&self) -> Decimal {
        self.quantity.abs() * self.current_price
    }

    /// Leveraged distance to the stop loss, or zero when no stop is set.
    pub fn risk_usd(&self) -> Decimal {
        match self.stop_loss {
            Some(stop) => (self.entry_price - stop).abs() * self.quantity.abs() * self.leverage,
            None => Decimal::ZERO,
        }
    }
}

/// Per-symbol market context handed to a decision provider.
///
/// Mirrors what the market-data collaborator emits: the latest readings of
/// each indicator plus short trailing arrays (oldest first) so a decider can
/// look at recent shape, not just the last value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub interval: String,
    pub current_price: Decimal,
    pub current_ema_20: Decimal,
    pub current_macd: Decimal,
    pub current_rsi_7: Decimal,
    pub current_volume: Decimal,
    pub average_volume: Decimal,
    pub funding_rate: Decimal,
    pub mid_prices: Vec<Decimal>,
    pub ema_20: Vec<Decimal>,
    pub ema_50: Vec<Decimal>,
    pub macd: Vec<Decimal>,
    pub rsi_7: Vec<Decimal>,
    pub rsi_14: Vec<Decimal>,
    pub atr_3: Vec<Decimal>,
    pub atr_14: Vec<Decimal>,
}

/// A proposed trade as emitted by a decision provider.
///
/// This is untrusted external input: the shape is validated when a JSON
/// payload is parsed, and the numeric fields are re-validated by the
/// execution engine before any ledger mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub coin: String,
    pub signal: Signal,
    pub quantity: Decimal,
    #[serde(default)]
    pub profit_target: Option<Decimal>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub invalidation_condition: Option<String>,
    pub leverage: Decimal,
    #[serde(default = "default_confidence")]
    pub confidence: Decimal,
    #[serde(default)]
    pub risk_usd: Decimal,
    pub entry_price: Decimal,
}

fn default_confidence() -> Decimal {
    dec!(0.5)
}

impl TradeProposal {
    /// Converts the proposal into the engine's order input.
    ///
    /// The quantity sign is normalised from the signal (a sell proposal may
    /// arrive with either sign); the signal remains the source of truth for
    /// direction.
    pub fn into_order(self) -> OrderRequest {
        let magnitude = self.quantity.abs();
        let quantity = match self.signal {
            Signal::Sell => -magnitude,
            _ => magnitude,
        };

        OrderRequest {
            symbol: self.coin,
            signal: self.signal,
            quantity,
            price: self.entry_price,
            leverage: self.leverage,
            profit_target: self.profit_target,
            stop_loss: self.stop_loss,
            confidence: self.confidence,
        }
    }
}

/// The validated input to the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub signal: Signal,
    /// Signed magnitude request; the sign agrees with `signal`.
    pub quantity: Decimal,
    pub price: Decimal,
    pub leverage: Decimal,
    pub profit_target: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub confidence: Decimal,
}

/// Receipt for an admitted ledger transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub execution_id: Uuid,
    pub symbol: String,
    pub action: Action,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}
