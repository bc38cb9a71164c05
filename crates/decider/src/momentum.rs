use crate::Decider;
use crate::error::DeciderError;
use configuration::DecisionParams;
use core_types::{MarketSnapshot, Signal, TradeProposal};
use executor::PortfolioReport;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tracing::debug;

/// A rule-based decision provider built on RSI mean reversion.
///
/// Entries: RSI-7 under the oversold threshold proposes a long, over the
/// overbought threshold proposes a short. Exits: once RSI crosses back over
/// the far threshold against an open position, a close is proposed. Exit
/// levels come from ATR-14 distance; stake is a configured fraction of
/// available cash, taken as collateral.
pub struct MomentumDecider {
    params: DecisionParams,
}

impl MomentumDecider {
    /// Creates a new `MomentumDecider` with the given parameters.
    pub fn new(params: DecisionParams) -> Result<Self, DeciderError> {
        if params.rsi_oversold >= params.rsi_overbought {
            return Err(DeciderError::InvalidParameters(
                "rsi_oversold must be below rsi_overbought".to_string(),
            ));
        }
        if params.rsi_oversold < Decimal::ZERO || params.rsi_overbought > dec!(100) {
            return Err(DeciderError::InvalidParameters(
                "RSI thresholds must lie within [0, 100]".to_string(),
            ));
        }
        Ok(Self { params })
    }

    fn decide_symbol(
        &self,
        snapshot: &MarketSnapshot,
        report: &PortfolioReport,
    ) -> Option<TradeProposal> {
        let price = snapshot.current_price;
        if price <= Decimal::ZERO {
            return None;
        }
        let rsi = snapshot.current_rsi_7;

        let open = report
            .positions
            .iter()
            .find(|p| p.symbol == snapshot.symbol);

        // Exit first: a position whose RSI has swung to the far threshold
        // has mean-reverted; propose a close and let the next tick re-enter.
        if let Some(position) = open {
            let long = !position.quantity.is_sign_negative();
            let exhausted = if long {
                rsi >= self.params.rsi_overbought
            } else {
                rsi <= self.params.rsi_oversold
            };
            if exhausted {
                return Some(self.close_proposal(snapshot));
            }
            debug!(symbol = %snapshot.symbol, %rsi, "holding open position");
            return None;
        }

        if rsi <= self.params.rsi_oversold {
            self.entry_proposal(snapshot, report, Signal::Buy)
        } else if rsi >= self.params.rsi_overbought {
            self.entry_proposal(snapshot, report, Signal::Sell)
        } else {
            None
        }
    }

    fn entry_proposal(
        &self,
        snapshot: &MarketSnapshot,
        report: &PortfolioReport,
        signal: Signal,
    ) -> Option<TradeProposal> {
        let price = snapshot.current_price;
        let leverage = self.params.default_leverage;

        // Stake a fixed fraction of available cash as collateral.
        let collateral = report.available_cash * self.params.stake_pct;
        let quantity = (collateral * leverage / price).round_dp(4);
        if quantity <= Decimal::ZERO {
            return None;
        }

        // Exit levels in ATR multiples; fall back to a percentage band when
        // the series is too flat for a meaningful ATR.
        let atr = snapshot
            .atr_14
            .last()
            .copied()
            .filter(|atr| *atr > Decimal::ZERO)
            .unwrap_or(price * dec!(0.01));
        let (profit_target, stop_loss) = match signal {
            Signal::Buy => (
                price + atr * self.params.atr_target_mult,
                price - atr * self.params.atr_stop_mult,
            ),
            _ => (
                price - atr * self.params.atr_target_mult,
                price + atr * self.params.atr_stop_mult,
            ),
        };

        let crossed = match signal {
            Signal::Buy => "below",
            _ => "above",
        };
        let invalidation_condition = format!(
            "If the price closes {crossed} {stop_loss:.2} on a 3-minute candle"
        );

        // Confidence grows with the depth of the RSI excursion.
        let distance = match signal {
            Signal::Buy => self.params.rsi_oversold - snapshot.current_rsi_7,
            _ => snapshot.current_rsi_7 - self.params.rsi_overbought,
        };
        let confidence = (dec!(0.5) + distance / dec!(50)).min(Decimal::ONE);

        Some(TradeProposal {
            coin: snapshot.symbol.clone(),
            signal,
            quantity,
            profit_target: Some(profit_target.round_dp(2)),
            stop_loss: Some(stop_loss.round_dp(2)),
            invalidation_condition: Some(invalidation_condition),
            leverage,
            confidence: confidence.round_dp(2),
            risk_usd: ((price - stop_loss).abs() * quantity * leverage).round_dp(2),
            entry_price: price,
        })
    }

    fn close_proposal(&self, snapshot: &MarketSnapshot) -> TradeProposal {
        TradeProposal {
            coin: snapshot.symbol.clone(),
            signal: Signal::Close,
            quantity: Decimal::ZERO,
            profit_target: None,
            stop_loss: None,
            invalidation_condition: None,
            leverage: self.params.default_leverage,
            confidence: dec!(0.5),
            risk_usd: Decimal::ZERO,
            entry_price: snapshot.current_price,
        }
    }
}

impl Decider for MomentumDecider {
    fn decide(
        &mut self,
        market: &HashMap<String, MarketSnapshot>,
        report: &PortfolioReport,
    ) -> Result<Vec<TradeProposal>, DeciderError> {
        let mut proposals: Vec<TradeProposal> = market
            .values()
            .filter_map(|snapshot| self.decide_symbol(snapshot, report))
            .collect();
        // Stable output order regardless of map iteration order.
        proposals.sort_by(|a, b| a.coin.cmp(&b.coin));
        Ok(proposals)
    }
}
