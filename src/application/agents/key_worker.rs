//! One task per (symbol, timeframe) key, exclusively owning its
//! Orchestrator. Consumes scan triggers from a bounded(1) channel: the
//! sender side uses `try_send`, so a trigger landing while the previous
//! scan is still running (or its result still queued) is silently dropped
//! — exactly one scan per closed candle, never a backlog.

use crate::application::agents::orchestrator::Orchestrator;
use crate::domain::errors::EngineError;
use tokio::sync::mpsc::Receiver;
use tracing::{error, warn};

pub async fn run(symbol: String, timeframe: crate::domain::market::timeframe::Timeframe, mut orchestrator: Orchestrator, mut triggers: Receiver<()>) {
    while triggers.recv().await.is_some() {
        match orchestrator.run_scan().await {
            Ok(result) if result.fired => {
                // Orchestrator already logged the fired signal.
            }
            Ok(_) => {}
            Err(e) if e.is_skip_and_continue() => {
                warn!(symbol = %symbol, timeframe = %timeframe, error = %e, "scan declined");
            }
            Err(e @ EngineError::FetcherFatal { .. }) | Err(e @ EngineError::SinkFatal { .. }) => {
                error!(symbol = %symbol, timeframe = %timeframe, error = %e, "stopping worker after fatal error");
                return;
            }
            Err(e) => {
                // SinkTransient: the lock stays set so the signal is not
                // re-fired; surfacing here is log-only, the next scheduled
                // close will retry the scan from scratch.
                warn!(symbol = %symbol, timeframe = %timeframe, error = %e, "transient error, will retry at next close");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::detector::pivot_detector::PivotDetector;
    use crate::domain::market::candle::Candle;
    use crate::domain::market::pivot::VariantFilter;
    use crate::domain::market::timeframe::Timeframe;
    use crate::domain::ports::{CandleFetcher, SignalSink};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct EmptyFetcher;

    #[async_trait]
    impl CandleFetcher for EmptyFetcher {
        async fn fetch_closed_candles(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            _limit: usize,
        ) -> Result<Vec<Candle>, EngineError> {
            Ok(Vec::new())
        }
    }

    struct NoopSink;

    #[async_trait]
    impl SignalSink for NoopSink {
        async fn publish(&self, _signal: &crate::domain::market::signal::Signal) -> Result<(), EngineError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn worker_exits_cleanly_when_trigger_channel_closes() {
        let orchestrator = Orchestrator::new(
            "BTCUSDT".to_string(),
            Timeframe::FiveMin,
            Arc::new(EmptyFetcher),
            Arc::new(NoopSink),
            None,
            PivotDetector::new(1, 1, true, VariantFilter::default()),
            50,
            200,
        );
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        run("BTCUSDT".to_string(), Timeframe::FiveMin, orchestrator, rx).await;
    }
}
