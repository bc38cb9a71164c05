use crate::portfolio::Portfolio;
use chrono::{DateTime, Utc};
use core_types::Position;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exit-plan block attached to a position's presentation record. Fields are
/// present only when the corresponding level is set on the position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExitPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_target: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidation_condition: Option<String>,
}

/// The rich presentation form of a single position, for display and for the
/// decision provider's account context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub symbol: String,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    pub liquidation_price: Option<Decimal>,
    pub unrealized_pnl: Decimal,
    pub leverage: Decimal,
    pub exit_plan: ExitPlan,
    pub confidence: Decimal,
    pub risk_usd: Decimal,
    pub notional_usd: Decimal,
}

impl PositionReport {
    pub fn for_position(position: &Position) -> Self {
        let invalidation_condition = position.stop_loss.map(|stop| {
            format!("If the price closes below {stop:.2} on a 3-minute candle")
        });

        Self {
            symbol: position.symbol.clone(),
            quantity: position.quantity,
            entry_price: position.entry_price,
            current_price: position.current_price,
            liquidation_price: position.liquidation_price,
            unrealized_pnl: position.unrealized_pnl(),
            leverage: position.leverage,
            exit_plan: ExitPlan {
                profit_target: position.profit_target,
                stop_loss: position.stop_loss,
                invalidation_condition,
            },
            confidence: position.confidence,
            risk_usd: position.risk_usd(),
            notional_usd: position.notional_usd(),
        }
    }
}

/// All positions in presentation form plus the aggregate account totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub positions: Vec<PositionReport>,
    pub timestamp: DateTime<Utc>,
    pub total_pnl: Decimal,
    pub available_cash: Decimal,
    pub total_asset: Decimal,
    pub initial_cash: Decimal,
}

impl Portfolio {
    /// The rich presentation record for one symbol, or `None` if the symbol
    /// has no open position.
    pub fn position_report(&self, symbol: &str) -> Option<PositionReport> {
        self.positions.get(symbol).map(PositionReport::for_position)
    }

    /// All positions in presentation form plus aggregate totals.
    pub fn report(&self) -> PortfolioReport {
        PortfolioReport {
            positions: self
                .positions
                .values()
                .map(PositionReport::for_position)
                .collect(),
            timestamp: Utc::now(),
            total_pnl: self.total_pnl(),
            available_cash: self.available_cash,
            total_asset: self.total_asset,
            initial_cash: self.initial_cash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn exit_plan_carries_invalidation_condition() {
        let position = Position::open(
            "BTC",
            dec!(0.5),
            dec!(45000),
            dec!(10),
            Some(dec!(47000)),
            Some(dec!(44000)),
            dec!(0.8),
        );

        let report = PositionReport::for_position(&position);
        assert_eq!(report.exit_plan.profit_target, Some(dec!(47000)));
        assert_eq!(report.exit_plan.stop_loss, Some(dec!(44000)));
        assert_eq!(
            report.exit_plan.invalidation_condition.as_deref(),
            Some("If the price closes below 44000.00 on a 3-minute candle")
        );
    }

    #[test]
    fn exit_plan_empty_without_levels() {
        let position = Position::open("BTC", dec!(1), dec!(100), dec!(5), None, None, dec!(0.5));
        let report = PositionReport::for_position(&position);
        assert_eq!(report.exit_plan, ExitPlan::default());

        let json = serde_json::to_value(&report.exit_plan).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn missing_symbol_reports_none() {
        let portfolio = Portfolio::new(dec!(1000));
        assert!(portfolio.position_report("BTC").is_none());
    }

    #[test]
    fn report_aggregates_totals() {
        let mut portfolio = Portfolio::new(dec!(10000));
        portfolio.upsert(Position::open(
            "BTC",
            dec!(0.5),
            dec!(45000),
            dec!(10),
            None,
            None,
            dec!(0.5),
        ));
        portfolio.update_price("BTC", dec!(46000));

        let report = portfolio.report();
        assert_eq!(report.positions.len(), 1);
        assert_eq!(report.total_pnl, dec!(5000));
        assert_eq!(report.available_cash, dec!(7750));
        assert_eq!(report.total_asset, dec!(15000));
        assert_eq!(report.initial_cash, dec!(10000));
        assert_eq!(report.positions[0].notional_usd, dec!(23000));
    }
}
