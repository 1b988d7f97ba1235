//! In-memory `CandleFetcher`: a fixed candle series per (symbol, timeframe)
//! key, seeded up front. Suitable for unit tests and local development.

use crate::domain::errors::EngineError;
use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::CandleFetcher;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub struct InMemoryCandleFetcher {
    series: RwLock<HashMap<(String, Timeframe), Vec<Candle>>>,
}

impl InMemoryCandleFetcher {
    pub fn new() -> Self {
        Self {
            series: RwLock::new(HashMap::new()),
        }
    }

    pub async fn seed(&self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) {
        self.series
            .write()
            .await
            .insert((symbol.to_string(), timeframe), candles);
    }
}

impl Default for InMemoryCandleFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandleFetcher for InMemoryCandleFetcher {
    async fn fetch_closed_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, EngineError> {
        let series = self.series.read().await;
        let candles = series
            .get(&(symbol.to_string(), timeframe))
            .cloned()
            .unwrap_or_default();
        let n = candles.len();
        let take = limit.min(n);
        Ok(candles[n - take..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn seeded_series_is_trimmed_to_limit() {
        let fetcher = InMemoryCandleFetcher::new();
        let candles: Vec<Candle> = (0..10)
            .map(|i| Candle::new("BTCUSDT", i * 300, dec!(1), dec!(2), dec!(0), dec!(1), dec!(1)).unwrap())
            .collect();
        fetcher.seed("BTCUSDT", Timeframe::FiveMin, candles).await;

        let fetched = fetcher
            .fetch_closed_candles("BTCUSDT", Timeframe::FiveMin, 5)
            .await
            .unwrap();
        assert_eq!(fetched.len(), 5);
        assert_eq!(fetched[0].open_time, 5 * 300);
    }

    #[tokio::test]
    async fn unseeded_key_returns_empty() {
        let fetcher = InMemoryCandleFetcher::new();
        let fetched = fetcher
            .fetch_closed_candles("ETHUSDT", Timeframe::FiveMin, 5)
            .await
            .unwrap();
        assert!(fetched.is_empty());
    }
}
