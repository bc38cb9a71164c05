use chrono::{Duration, Utc};
use core_types::Kline;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Generates a deterministic candle series for simulated sessions.
///
/// The price path is a slow drift with two superimposed oscillations, phase
/// shifted by a per-symbol seed so tracked symbols do not move in lockstep.
/// No randomness: the same symbol and bar count always produce the same
/// series, which keeps simulated runs and tests reproducible.
pub fn synthetic_klines(
    symbol: &str,
    base_price: Decimal,
    bars: usize,
    interval_secs: i64,
) -> Vec<Kline> {
    let seed = symbol.bytes().map(|b| b as f64).sum::<f64>();
    let base = base_price.to_f64().unwrap_or(1.0);
    let start = Utc::now() - Duration::seconds(interval_secs * bars as i64);

    let price_at = |t: f64| -> f64 {
        let drift = 1.0 + 0.0004 * t * (seed % 3.0 - 1.0);
        let swing = 0.02 * (t / 7.0 + seed).sin() + 0.008 * (t / 2.5 + seed * 2.0).sin();
        base * drift * (1.0 + swing)
    };

    let mut klines = Vec::with_capacity(bars);
    let mut prev_close = price_at(0.0);

    for i in 0..bars {
        let t = (i + 1) as f64;
        let close = price_at(t);
        let open = prev_close;
        let high = open.max(close) * 1.001;
        let low = open.min(close) * 0.999;
        let volume = 100.0 + 40.0 * (t / 5.0 + seed).sin().abs();

        let open_time = start + Duration::seconds(interval_secs * i as i64);
        klines.push(Kline {
            open_time,
            open: to_price(open),
            high: to_price(high),
            low: to_price(low),
            close: to_price(close),
            volume: to_price(volume),
            close_time: open_time + Duration::seconds(interval_secs),
        });
        prev_close = close;
    }

    klines
}

fn to_price(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(dec!(0)).round_dp(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_is_deterministic() {
        let a = synthetic_klines("BTC", dec!(45000), 50, 180);
        let b = synthetic_klines("BTC", dec!(45000), 50, 180);
        assert_eq!(
            a.iter().map(|k| k.close).collect::<Vec<_>>(),
            b.iter().map(|k| k.close).collect::<Vec<_>>()
        );
    }

    #[test]
    fn symbols_get_distinct_paths() {
        let btc = synthetic_klines("BTC", dec!(100), 50, 180);
        let eth = synthetic_klines("ETH", dec!(100), 50, 180);
        assert_ne!(
            btc.iter().map(|k| k.close).collect::<Vec<_>>(),
            eth.iter().map(|k| k.close).collect::<Vec<_>>()
        );
    }

    #[test]
    fn bars_are_well_formed() {
        for kline in synthetic_klines("SOL", dec!(100), 30, 180) {
            assert!(kline.high >= kline.open && kline.high >= kline.close);
            assert!(kline.low <= kline.open && kline.low <= kline.close);
            assert!(kline.close > Decimal::ZERO);
            assert!(kline.close_time > kline.open_time);
        }
    }
}
