//! Port interfaces to external collaborators. The engine never depends on
//! a concrete exchange client, sink, or store — only these traits — so the
//! fetcher, the notification/dashboard sink, and durable storage stay
//! swappable and out of this crate's scope.

use crate::domain::errors::EngineError;
use crate::domain::market::candle::Candle;
use crate::domain::market::signal::Signal;
use crate::domain::market::timeframe::Timeframe;
use async_trait::async_trait;

/// Supplies closed candles. Implementations must exclude any candle still
/// forming.
#[async_trait]
pub trait CandleFetcher: Send + Sync {
    /// Fetch the most recent `limit` closed candles for `symbol` at the
    /// given native timeframe, ordered ascending by open time. For
    /// aggregated timeframes the orchestrator requests the 5m base stream
    /// itself and aggregates locally — this trait only ever sees base
    /// timeframes it was asked for directly.
    async fn fetch_closed_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, EngineError>;
}

/// Publishes confirmed signals downstream (alerting, persistence,
/// dashboards, trading). Exactly one of `Ok`, `SinkTransient`, or
/// `SinkFatal` per call — never a partial publish.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn publish(&self, signal: &Signal) -> Result<(), EngineError>;
}

/// Durable storage for fired signals, matching the `alerts` table contract.
#[async_trait]
pub trait SignalRepository: Send + Sync {
    async fn save(&self, signal: &Signal) -> anyhow::Result<()>;

    async fn find_by_symbol_timeframe(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> anyhow::Result<Vec<Signal>>;
}
