//! Per-(symbol, timeframe) scan orchestrator.
//!
//! Owns the mutable `TimeframeState` for its key exclusively — no other
//! task ever touches it. A single scan: fetch candles (aggregating locally
//! for non-native timeframes) → rebuild pivots → validate the last eight →
//! confirm against the last three closed candles → publish on fire.

use crate::application::detector::choch_confirmer::ChochConfirmer;
use crate::application::detector::eight_pivot_validator::EightPivotValidator;
use crate::application::detector::pivot_detector::PivotDetector;
use crate::application::market_data::candle_aggregator::CandleAggregator;
use crate::domain::errors::EngineError;
use crate::domain::market::candle::Candle;
use crate::domain::market::signal::DetectionResult;
use crate::domain::market::state::TimeframeState;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::{CandleFetcher, SignalRepository, SignalSink};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Orchestrator {
    symbol: String,
    timeframe: Timeframe,
    fetcher: Arc<dyn CandleFetcher>,
    sink: Arc<dyn SignalSink>,
    repository: Option<Arc<dyn SignalRepository>>,
    pivot_detector: PivotDetector,
    window_size: usize,
    state: TimeframeState,
}

impl Orchestrator {
    pub fn new(
        symbol: String,
        timeframe: Timeframe,
        fetcher: Arc<dyn CandleFetcher>,
        sink: Arc<dyn SignalSink>,
        repository: Option<Arc<dyn SignalRepository>>,
        pivot_detector: PivotDetector,
        window_size: usize,
        keep_pivots: usize,
    ) -> Self {
        Self {
            symbol,
            timeframe,
            fetcher,
            sink,
            repository,
            pivot_detector,
            window_size,
            state: TimeframeState::new(keep_pivots),
        }
    }

    /// Run one scan cycle. `Ok` always carries a `DetectionResult`, which is
    /// `none()` on any declined-but-not-erroneous outcome.
    pub async fn run_scan(&mut self) -> Result<DetectionResult, EngineError> {
        let candles = self.fetch_window().await?;
        if candles.len() < self.window_size {
            return Err(EngineError::InsufficientData {
                symbol: self.symbol.clone(),
                timeframe: self.timeframe.to_string(),
                have: candles.len(),
                need: self.window_size,
            });
        }

        self.state.rebuild_pivots();
        for pivot in self.pivot_detector.detect(&candles) {
            self.state.push_pivot(pivot);
        }

        let Some(last_eight) = self.state.last_eight() else {
            return Ok(DetectionResult::none());
        };

        // Unlock is evaluated against the anchor of whichever pattern is
        // currently locked (recorded at the moment it fired), not against
        // the pattern this scan is about to validate — `last_pattern` below
        // is simply overwritten with the freshest candidate regardless of
        // lock state.
        let newest_open_time = candles[last_eight[7].bar_index].open_time;
        self.state.maybe_unlock(newest_open_time);

        let Some(pattern) = EightPivotValidator::validate(&last_eight, &candles) else {
            return Ok(DetectionResult::none());
        };
        self.state.last_pattern = Some(pattern);

        if candles.len() < 3 {
            return Err(EngineError::InsufficientData {
                symbol: self.symbol.clone(),
                timeframe: self.timeframe.to_string(),
                have: candles.len(),
                need: 3,
            });
        }
        let n = candles.len();
        let (pre, mid, cur) = (&candles[n - 3], &candles[n - 2], &candles[n - 1]);

        let result = ChochConfirmer::confirm(
            &self.symbol,
            self.timeframe,
            &mut self.state,
            pre,
            mid,
            cur,
            n - 1,
        );

        if result.fired {
            let signal = result.signal.as_ref().expect("fired implies signal");
            self.sink
                .publish(signal)
                .await
                .map_err(|e| self.tag_sink_error(e))?;
            if let Some(repository) = &self.repository
                && let Err(e) = repository.save(signal).await
            {
                warn!(
                    symbol = %self.symbol,
                    timeframe = %self.timeframe,
                    error = %e,
                    "failed to persist fired signal; sink publish already succeeded"
                );
            }
            info!(
                symbol = %self.symbol,
                timeframe = %self.timeframe,
                direction = ?signal.direction,
                group = signal.group.label(),
                price = %signal.price,
                "CHoCH signal fired"
            );
        }

        Ok(result)
    }

    fn tag_sink_error(&self, error: EngineError) -> EngineError {
        match error {
            EngineError::SinkTransient { source, .. } => EngineError::SinkTransient {
                symbol: self.symbol.clone(),
                timeframe: self.timeframe.to_string(),
                source,
            },
            EngineError::SinkFatal { source, .. } => EngineError::SinkFatal {
                symbol: self.symbol.clone(),
                timeframe: self.timeframe.to_string(),
                source,
            },
            other => other,
        }
    }

    async fn fetch_window(&self) -> Result<Vec<Candle>, EngineError> {
        if self.timeframe.is_aggregated() {
            let base_limit = self.window_size * self.timeframe.base_multiplier() as usize;
            let base = self
                .fetcher
                .fetch_closed_candles(&self.symbol, Timeframe::FiveMin, base_limit)
                .await?;
            let mut aggregated = CandleAggregator::aggregate(&base, self.timeframe);
            if aggregated.len() > self.window_size {
                let drop = aggregated.len() - self.window_size;
                aggregated.drain(0..drop);
            }
            Ok(aggregated)
        } else {
            self.fetcher
                .fetch_closed_candles(&self.symbol, self.timeframe, self.window_size)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::pivot::VariantFilter;
    use crate::domain::market::signal::Signal;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubFetcher {
        candles: Vec<Candle>,
    }

    #[async_trait]
    impl CandleFetcher for StubFetcher {
        async fn fetch_closed_candles(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            limit: usize,
        ) -> Result<Vec<Candle>, EngineError> {
            let n = self.candles.len();
            let take = limit.min(n);
            Ok(self.candles[n - take..].to_vec())
        }
    }

    struct CountingSink {
        published: AtomicUsize,
        last: Mutex<Option<Signal>>,
    }

    #[async_trait]
    impl SignalSink for CountingSink {
        async fn publish(&self, signal: &Signal) -> Result<(), EngineError> {
            self.published.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(signal.clone());
            Ok(())
        }
    }

    fn flat_candle(open_time: i64, price: i64, vol: i64) -> Candle {
        let p = Decimal::from(price);
        Candle::new(
            "BTCUSDT",
            open_time,
            p,
            p + Decimal::from(1),
            p - Decimal::from(1),
            p,
            Decimal::from(vol),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insufficient_candles_returns_error() {
        let fetcher = Arc::new(StubFetcher {
            candles: (0..10).map(|i| flat_candle(i * 300, 100, 1)).collect(),
        });
        let sink = Arc::new(CountingSink {
            published: AtomicUsize::new(0),
            last: Mutex::new(None),
        });
        let mut orchestrator = Orchestrator::new(
            "BTCUSDT".to_string(),
            Timeframe::FiveMin,
            fetcher,
            sink,
            None,
            PivotDetector::new(1, 1, true, VariantFilter::default()),
            50,
            200,
        );

        let result = orchestrator.run_scan().await;
        assert!(matches!(result, Err(EngineError::InsufficientData { .. })));
    }

    #[tokio::test]
    async fn flat_series_never_fires() {
        // A perfectly flat series has no pivots at all, so the scan simply
        // declines without error.
        let fetcher = Arc::new(StubFetcher {
            candles: (0..50).map(|i| flat_candle(i * 300, 100, 1)).collect(),
        });
        let sink = Arc::new(CountingSink {
            published: AtomicUsize::new(0),
            last: Mutex::new(None),
        });
        let mut orchestrator = Orchestrator::new(
            "BTCUSDT".to_string(),
            Timeframe::FiveMin,
            fetcher,
            sink.clone(),
            None,
            PivotDetector::new(1, 1, true, VariantFilter::default()),
            50,
            200,
        );

        let result = orchestrator.run_scan().await.unwrap();
        assert!(!result.fired);
        assert_eq!(sink.published.load(Ordering::SeqCst), 0);
    }
}
