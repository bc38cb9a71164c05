use crate::error::Rejection;
use crate::portfolio::Portfolio;
use chrono::Utc;
use core_types::{Action, Execution, OrderRequest, Position, Side, Signal};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

/// Runs one proposed trade through validation and the per-symbol state
/// machine, mutating the ledger only when the transition is admitted.
///
/// The state machine, per symbol:
///
/// | state        | buy                | sell               | close  | hold |
/// |--------------|--------------------|--------------------|--------|------|
/// | no position  | open long          | open short         | reject | reject |
/// | long         | reject (same dir)  | reverse to short   | close  | reject |
/// | short        | reverse to long    | reject (same dir)  | close  | reject |
///
/// Validation fails fast and never mutates: price and leverage must be
/// positive for every signal; quantity and sufficient collateral are only
/// checked for buy/sell. The collateral check runs against `available_cash`
/// as it stands before the call — a reversal does not get to spend the old
/// leg's credit.
pub fn execute_order(
    portfolio: &mut Portfolio,
    order: &OrderRequest,
) -> Result<Execution, Rejection> {
    validate(portfolio, order)?;

    let open_side = portfolio.positions.get(&order.symbol).map(Position::side);

    let execution = match (order.signal, open_side) {
        (Signal::Hold, _) => return Err(Rejection::NothingToDo(order.symbol.clone())),

        (Signal::Close, None) => return Err(Rejection::NoPositionToClose(order.symbol.clone())),
        (Signal::Close, Some(_)) => {
            let quantity = portfolio
                .positions
                .get(&order.symbol)
                .map(|p| p.quantity)
                .unwrap_or(Decimal::ZERO);
            portfolio.remove(&order.symbol);
            receipt(order, Action::Closed, quantity)
        }

        (Signal::Buy, Some(Side::Long)) => {
            return Err(Rejection::SameDirectionExists {
                symbol: order.symbol.clone(),
                side: Side::Long,
            });
        }
        (Signal::Sell, Some(Side::Short)) => {
            return Err(Rejection::SameDirectionExists {
                symbol: order.symbol.clone(),
                side: Side::Short,
            });
        }

        // Reversal: close the old leg (crediting collateral + PnL), then
        // open the opposite leg at the order price, in one admitted call.
        (Signal::Buy, Some(Side::Short)) => {
            portfolio.remove(&order.symbol);
            let quantity = open_position(portfolio, order, Side::Long);
            receipt(order, Action::ReversedToLong, quantity)
        }
        (Signal::Sell, Some(Side::Long)) => {
            portfolio.remove(&order.symbol);
            let quantity = open_position(portfolio, order, Side::Short);
            receipt(order, Action::ReversedToShort, quantity)
        }

        (Signal::Buy, None) => {
            let quantity = open_position(portfolio, order, Side::Long);
            receipt(order, Action::OpenedLong, quantity)
        }
        (Signal::Sell, None) => {
            let quantity = open_position(portfolio, order, Side::Short);
            receipt(order, Action::OpenedShort, quantity)
        }
    };

    info!(
        symbol = %execution.symbol,
        action = ?execution.action,
        quantity = %execution.quantity,
        price = %execution.price,
        "order admitted"
    );
    Ok(execution)
}

fn validate(portfolio: &Portfolio, order: &OrderRequest) -> Result<(), Rejection> {
    if order.price <= Decimal::ZERO {
        return Err(Rejection::InvalidPrice(order.price));
    }
    if order.leverage <= Decimal::ZERO {
        return Err(Rejection::InvalidLeverage(order.leverage));
    }
    if matches!(order.signal, Signal::Buy | Signal::Sell) {
        if order.quantity.is_zero() {
            return Err(Rejection::ZeroQuantity(order.symbol.clone()));
        }
        let required = order.quantity.abs() * order.price / order.leverage;
        if required > portfolio.available_cash {
            return Err(Rejection::InsufficientCash {
                required,
                available: portfolio.available_cash,
            });
        }
    }
    Ok(())
}

/// Opens a position for the order on the given side and reserves its
/// collateral. Returns the signed quantity that was stored.
fn open_position(portfolio: &mut Portfolio, order: &OrderRequest, side: Side) -> Decimal {
    let magnitude = order.quantity.abs();
    let quantity = match side {
        Side::Long => magnitude,
        Side::Short => -magnitude,
    };

    let position = Position::open(
        order.symbol.clone(),
        quantity,
        order.price,
        order.leverage,
        order.profit_target,
        order.stop_loss,
        order.confidence,
    );
    portfolio.upsert(position);
    quantity
}

fn receipt(order: &OrderRequest, action: Action, quantity: Decimal) -> Execution {
    Execution {
        execution_id: Uuid::new_v4(),
        symbol: order.symbol.clone(),
        action,
        quantity,
        price: order.price,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(symbol: &str, signal: Signal, quantity: Decimal, price: Decimal) -> OrderRequest {
        OrderRequest {
            symbol: symbol.to_string(),
            signal,
            quantity,
            price,
            leverage: dec!(5),
            profit_target: None,
            stop_loss: None,
            confidence: dec!(0.5),
        }
    }

    // --- Validation ---

    #[test]
    fn rejects_non_positive_price() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let result = execute_order(&mut portfolio, &order("BTC", Signal::Buy, dec!(1), dec!(0)));
        assert_eq!(result, Err(Rejection::InvalidPrice(dec!(0))));
        assert_eq!(portfolio.available_cash, dec!(1000));
    }

    #[test]
    fn rejects_non_positive_leverage() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let mut bad = order("BTC", Signal::Buy, dec!(1), dec!(100));
        bad.leverage = dec!(-2);
        let result = execute_order(&mut portfolio, &bad);
        assert_eq!(result, Err(Rejection::InvalidLeverage(dec!(-2))));
    }

    #[test]
    fn rejects_zero_quantity_for_buy() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let result = execute_order(&mut portfolio, &order("BTC", Signal::Buy, dec!(0), dec!(100)));
        assert_eq!(result, Err(Rejection::ZeroQuantity("BTC".to_string())));
    }

    #[test]
    fn rejects_insufficient_cash() {
        let mut portfolio = Portfolio::new(dec!(10));
        let result = execute_order(&mut portfolio, &order("BTC", Signal::Buy, dec!(1), dec!(100)));
        assert_eq!(
            result,
            Err(Rejection::InsufficientCash {
                required: dec!(20),
                available: dec!(10),
            })
        );
        assert!(portfolio.positions.is_empty());
    }

    // --- State machine: no position ---

    #[test]
    fn buy_opens_long_and_reserves_collateral() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let execution =
            execute_order(&mut portfolio, &order("BTC", Signal::Buy, dec!(1), dec!(100))).unwrap();

        assert_eq!(execution.action, Action::OpenedLong);
        assert_eq!(portfolio.available_cash, dec!(980));
        assert_eq!(portfolio.positions["BTC"].side(), Side::Long);
    }

    #[test]
    fn sell_opens_short_with_negative_quantity() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let execution =
            execute_order(&mut portfolio, &order("ETH", Signal::Sell, dec!(1), dec!(200))).unwrap();

        assert_eq!(execution.action, Action::OpenedShort);
        assert_eq!(execution.quantity, dec!(-1));
        assert_eq!(portfolio.positions["ETH"].quantity, dec!(-1));
    }

    #[test]
    fn close_without_position_is_rejected() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let result = execute_order(&mut portfolio, &order("BTC", Signal::Close, dec!(0), dec!(100)));
        assert_eq!(result, Err(Rejection::NoPositionToClose("BTC".to_string())));
        assert_eq!(portfolio.available_cash, dec!(1000));
    }

    #[test]
    fn hold_is_rejected_as_noop() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let result = execute_order(&mut portfolio, &order("BTC", Signal::Hold, dec!(0), dec!(100)));
        assert_eq!(result, Err(Rejection::NothingToDo("BTC".to_string())));
    }

    // --- State machine: open position ---

    #[test]
    fn open_then_close_round_trips_cash() {
        let mut portfolio = Portfolio::new(dec!(1000));
        execute_order(&mut portfolio, &order("BTC", Signal::Buy, dec!(1), dec!(100))).unwrap();
        assert_eq!(portfolio.available_cash, dec!(980));

        let execution =
            execute_order(&mut portfolio, &order("BTC", Signal::Close, dec!(0), dec!(100)))
                .unwrap();

        assert_eq!(execution.action, Action::Closed);
        assert_eq!(portfolio.available_cash, dec!(1000));
        assert!(!portfolio.positions.contains_key("BTC"));
    }

    #[test]
    fn same_direction_buy_is_rejected() {
        let mut portfolio = Portfolio::new(dec!(1000));
        execute_order(&mut portfolio, &order("ETH", Signal::Buy, dec!(1), dec!(200))).unwrap();
        let cash = portfolio.available_cash;

        let result = execute_order(&mut portfolio, &order("ETH", Signal::Buy, dec!(1), dec!(200)));
        assert_eq!(
            result,
            Err(Rejection::SameDirectionExists {
                symbol: "ETH".to_string(),
                side: Side::Long,
            })
        );
        assert_eq!(portfolio.available_cash, cash);
        assert_eq!(portfolio.positions.len(), 1);
    }

    #[test]
    fn same_direction_sell_is_rejected() {
        let mut portfolio = Portfolio::new(dec!(1000));
        execute_order(&mut portfolio, &order("ETH", Signal::Sell, dec!(1), dec!(200))).unwrap();

        let result = execute_order(&mut portfolio, &order("ETH", Signal::Sell, dec!(1), dec!(200)));
        assert_eq!(
            result,
            Err(Rejection::SameDirectionExists {
                symbol: "ETH".to_string(),
                side: Side::Short,
            })
        );
    }

    #[test]
    fn hold_with_open_position_is_rejected() {
        let mut portfolio = Portfolio::new(dec!(1000));
        execute_order(&mut portfolio, &order("SOL", Signal::Buy, dec!(2), dec!(50))).unwrap();
        let cash = portfolio.available_cash;

        let result = execute_order(&mut portfolio, &order("SOL", Signal::Hold, dec!(0), dec!(50)));
        assert_eq!(result, Err(Rejection::NothingToDo("SOL".to_string())));
        assert_eq!(portfolio.available_cash, cash);
    }

    #[test]
    fn sell_against_long_reverses_to_short() {
        let mut portfolio = Portfolio::new(dec!(1000));
        execute_order(&mut portfolio, &order("ETH", Signal::Buy, dec!(1), dec!(200))).unwrap();
        // collateral 40 reserved
        assert_eq!(portfolio.available_cash, dec!(960));

        let execution =
            execute_order(&mut portfolio, &order("ETH", Signal::Sell, dec!(1), dec!(210))).unwrap();

        assert_eq!(execution.action, Action::ReversedToShort);
        let eth = &portfolio.positions["ETH"];
        assert_eq!(eth.quantity, dec!(-1));
        assert_eq!(eth.entry_price, dec!(210));
        // old leg credited 40 collateral + 0 pnl, new leg reserves 42
        assert_eq!(portfolio.available_cash, dec!(958));
    }

    #[test]
    fn buy_against_short_reverses_to_long() {
        let mut portfolio = Portfolio::new(dec!(1000));
        execute_order(&mut portfolio, &order("ETH", Signal::Sell, dec!(1), dec!(200))).unwrap();

        let execution =
            execute_order(&mut portfolio, &order("ETH", Signal::Buy, dec!(1), dec!(190))).unwrap();

        assert_eq!(execution.action, Action::ReversedToLong);
        let eth = &portfolio.positions["ETH"];
        assert_eq!(eth.side(), Side::Long);
        assert_eq!(eth.entry_price, dec!(190));
    }

    #[test]
    fn leveraged_pnl_realizes_on_close() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let mut open = order("BTC", Signal::Buy, dec!(0.5), dec!(45000));
        open.leverage = dec!(10);
        execute_order(&mut portfolio, &open).unwrap();

        portfolio.update_price("BTC", dec!(46000));
        assert_eq!(portfolio.positions["BTC"].unrealized_pnl(), dec!(5000));

        execute_order(&mut portfolio, &order("BTC", Signal::Close, dec!(0), dec!(46000))).unwrap();
        assert_eq!(portfolio.available_cash, dec!(15000));
    }

    #[test]
    fn liquidation_price_set_once_at_open() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let mut open = order("BTC", Signal::Buy, dec!(0.5), dec!(45000));
        open.leverage = dec!(10);
        execute_order(&mut portfolio, &open).unwrap();

        let liquidation = portfolio.positions["BTC"].liquidation_price;
        assert_eq!(liquidation, Some(dec!(40500)));

        portfolio.update_price("BTC", dec!(50000));
        assert_eq!(portfolio.positions["BTC"].liquidation_price, liquidation);
    }

    #[test]
    fn unleveraged_open_has_no_liquidation_price() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let mut open = order("SOL", Signal::Buy, dec!(2), dec!(50));
        open.leverage = dec!(1);
        execute_order(&mut portfolio, &open).unwrap();
        assert_eq!(portfolio.positions["SOL"].liquidation_price, None);
    }
}
