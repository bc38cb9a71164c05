use rust_decimal::Decimal;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub portfolio: PortfolioSettings,
    pub tracker: TrackerSettings,
    pub decision: DecisionParams,
}

/// Cash and persistence settings for the portfolio ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioSettings {
    /// Starting cash for a fresh ledger, in quote currency.
    pub initial_cash: Decimal,
    /// Where the portfolio snapshot is written after each loop.
    pub snapshot_path: String,
}

/// Which symbols to track and how much market context to request.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSettings {
    /// The symbols the tracker follows (e.g., "BTC", "ETH").
    pub symbols: Vec<String>,
    /// Candle interval fed to the market-data provider (e.g., "3m").
    pub interval: String,
    /// How many trailing bars of indicator history each snapshot carries.
    pub candle_history: usize,
    /// Pause between loop iterations when running against a paced feed.
    pub loop_pause_secs: u64,
}

/// Parameters for the rule-based momentum decision provider.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionParams {
    /// RSI level below which a long entry is proposed.
    pub rsi_oversold: Decimal,
    /// RSI level above which a short entry is proposed.
    pub rsi_overbought: Decimal,
    /// Fraction of available cash staked as collateral per new position.
    pub stake_pct: Decimal,
    pub default_leverage: Decimal,
    /// Profit-target distance from entry, in ATR-14 multiples.
    pub atr_target_mult: Decimal,
    /// Stop-loss distance from entry, in ATR-14 multiples.
    pub atr_stop_mult: Decimal,
}
