use crate::MarketDataProvider;
use crate::error::MarketDataError;
use crate::indicators::build_snapshot;
use async_trait::async_trait;
use core_types::{Kline, MarketSnapshot};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A deterministic market-data provider that replays in-memory candle
/// series, revealing one more bar per `step()` call.
///
/// The cursor is shared across symbols: every tracked symbol advances in
/// lockstep, the way a live feed delivers one bar per interval. Symbols the
/// provider has no series for (or whose series is exhausted before the
/// cursor) simply report no data.
pub struct ReplayProvider {
    series: HashMap<String, Vec<Kline>>,
    cursor: AtomicUsize,
}

impl ReplayProvider {
    /// Creates a provider over the given candle series, with `warmup` bars
    /// already visible so indicators have history to converge on from the
    /// first tick.
    pub fn new(series: HashMap<String, Vec<Kline>>, warmup: usize) -> Self {
        Self {
            series,
            cursor: AtomicUsize::new(warmup),
        }
    }

    /// Reveals the next bar. Returns `false` once every series is
    /// exhausted, signalling the end of the replay.
    pub fn step(&self) -> bool {
        let cursor = self.cursor.fetch_add(1, Ordering::Relaxed) + 1;
        self.series.values().any(|bars| cursor < bars.len())
    }

    fn visible(&self, symbol: &str) -> Option<&[Kline]> {
        let bars = self.series.get(symbol)?;
        let cursor = self.cursor.load(Ordering::Relaxed).min(bars.len());
        if cursor == 0 { None } else { Some(&bars[..cursor]) }
    }
}

#[async_trait]
impl MarketDataProvider for ReplayProvider {
    async fn last_price(&self, symbol: &str) -> Result<Option<Decimal>, MarketDataError> {
        Ok(self
            .visible(symbol)
            .and_then(|bars| bars.last())
            .map(|kline| kline.close))
    }

    async fn market_snapshot(
        &self,
        symbol: &str,
        interval: &str,
        count: usize,
    ) -> Result<Option<MarketSnapshot>, MarketDataError> {
        Ok(self
            .visible(symbol)
            .and_then(|bars| build_snapshot(symbol, interval, bars, count)))
    }
}
