use core_types::{Kline, MarketSnapshot};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use ta::Next as _;
use ta::indicators::{
    AverageTrueRange, ExponentialMovingAverage, MovingAverageConvergenceDivergence,
    RelativeStrengthIndex,
};

/// Computes the indicator context for a symbol from its candle history.
///
/// Indicators are warmed over the entire series (the `ta` indicators are
/// stateful and converge as bars stream in), then only the trailing `count`
/// readings are kept. Returns `None` when there are no candles — callers
/// treat that as "no data this tick", never as a failure.
pub(crate) fn build_snapshot(
    symbol: &str,
    interval: &str,
    klines: &[Kline],
    count: usize,
) -> Option<MarketSnapshot> {
    if klines.is_empty() || count == 0 {
        return None;
    }

    let mut ema_20 = ExponentialMovingAverage::new(20).ok()?;
    let mut ema_50 = ExponentialMovingAverage::new(50).ok()?;
    let mut macd = MovingAverageConvergenceDivergence::default();
    let mut rsi_7 = RelativeStrengthIndex::new(7).ok()?;
    let mut rsi_14 = RelativeStrengthIndex::new(14).ok()?;
    let mut atr_3 = AverageTrueRange::new(3).ok()?;
    let mut atr_14 = AverageTrueRange::new(14).ok()?;

    let mut mids = Vec::with_capacity(klines.len());
    let mut ema_20_series = Vec::with_capacity(klines.len());
    let mut ema_50_series = Vec::with_capacity(klines.len());
    let mut macd_series = Vec::with_capacity(klines.len());
    let mut rsi_7_series = Vec::with_capacity(klines.len());
    let mut rsi_14_series = Vec::with_capacity(klines.len());
    let mut atr_3_series = Vec::with_capacity(klines.len());
    let mut atr_14_series = Vec::with_capacity(klines.len());

    for kline in klines {
        // The `ta` indicators work in f64; readings are converted back to
        // Decimal at the boundary.
        let close = kline.close.to_f64()?;

        mids.push((kline.high + kline.low) / dec!(2));
        ema_20_series.push(ema_20.next(close));
        ema_50_series.push(ema_50.next(close));
        macd_series.push(macd.next(close).macd);
        rsi_7_series.push(rsi_7.next(close));
        rsi_14_series.push(rsi_14.next(close));
        atr_3_series.push(atr_3.next(close));
        atr_14_series.push(atr_14.next(close));
    }

    let last = klines.last()?;
    let tail_start = klines.len().saturating_sub(count);

    let to_decimals = |series: &[f64]| -> Vec<Decimal> {
        series[tail_start..]
            .iter()
            .filter_map(|v| Decimal::from_f64(*v))
            .collect()
    };

    let recent_volumes = &klines[tail_start..];
    let average_volume = recent_volumes
        .iter()
        .map(|k| k.volume)
        .sum::<Decimal>()
        / Decimal::from(recent_volumes.len());

    Some(MarketSnapshot {
        symbol: symbol.to_string(),
        interval: interval.to_string(),
        current_price: last.close,
        current_ema_20: ema_20_series.last().and_then(|v| Decimal::from_f64(*v))?,
        current_macd: macd_series.last().and_then(|v| Decimal::from_f64(*v))?,
        current_rsi_7: rsi_7_series.last().and_then(|v| Decimal::from_f64(*v))?,
        current_volume: last.volume,
        average_volume,
        // Funding is exchange-specific; local providers report none.
        funding_rate: Decimal::ZERO,
        mid_prices: mids[tail_start..].to_vec(),
        ema_20: to_decimals(&ema_20_series),
        ema_50: to_decimals(&ema_50_series),
        macd: to_decimals(&macd_series),
        rsi_7: to_decimals(&rsi_7_series),
        rsi_14: to_decimals(&rsi_14_series),
        atr_3: to_decimals(&atr_3_series),
        atr_14: to_decimals(&atr_14_series),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::synthetic_klines;

    #[test]
    fn empty_history_yields_no_snapshot() {
        assert!(build_snapshot("BTC", "3m", &[], 10).is_none());
    }

    #[test]
    fn snapshot_arrays_are_bounded_by_count() {
        let klines = synthetic_klines("BTC", dec!(45000), 120, 180);
        let snapshot = build_snapshot("BTC", "3m", &klines, 10).unwrap();

        assert_eq!(snapshot.mid_prices.len(), 10);
        assert_eq!(snapshot.ema_20.len(), 10);
        assert_eq!(snapshot.rsi_7.len(), 10);
        assert_eq!(snapshot.atr_14.len(), 10);
        assert_eq!(snapshot.symbol, "BTC");
        assert_eq!(snapshot.interval, "3m");
    }

    #[test]
    fn rsi_readings_stay_in_range() {
        let klines = synthetic_klines("ETH", dec!(3000), 120, 180);
        let snapshot = build_snapshot("ETH", "3m", &klines, 20).unwrap();

        for rsi in snapshot.rsi_7.iter().chain(snapshot.rsi_14.iter()) {
            assert!(*rsi >= Decimal::ZERO && *rsi <= dec!(100), "rsi out of range: {rsi}");
        }
    }

    #[test]
    fn current_price_matches_last_close() {
        let klines = synthetic_klines("SOL", dec!(100), 60, 180);
        let snapshot = build_snapshot("SOL", "3m", &klines, 10).unwrap();
        assert_eq!(snapshot.current_price, klines.last().unwrap().close);
    }

    #[test]
    fn short_history_yields_short_arrays() {
        let klines = synthetic_klines("BTC", dec!(45000), 4, 180);
        let snapshot = build_snapshot("BTC", "3m", &klines, 10).unwrap();
        assert_eq!(snapshot.mid_prices.len(), 4);
    }
}
