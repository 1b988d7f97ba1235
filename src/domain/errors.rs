//! Domain-specific error types for the CHoCH detection engine.
//!
//! Mirrors the error kinds in the component design: failures inside the
//! pure pattern-detection components never propagate past the orchestrator
//! as panics, they resolve to one of these variants and are handled per
//! the policy documented on each.

use thiserror::Error;

/// Errors that can occur while scanning a single (symbol, timeframe) key.
///
/// Every variant here is a *declined scan*, not a crash: the orchestrator
/// matches on these to decide whether to skip-and-retry-next-close,
/// surface to the supervisor, or retain the CHoCH lock for a later replay.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A candle violates `low <= min(open,close) <= max(open,close) <= high`
    /// or carries negative volume. The offending scan is skipped.
    #[error("malformed candle for {symbol} at {open_time}: {reason}")]
    InputMalformed {
        symbol: String,
        open_time: i64,
        reason: String,
    },

    /// Fewer than the configured window of closed candles (or fewer than
    /// three for confirmation) were available. Silent no-op.
    #[error("insufficient data for {symbol}/{timeframe}: have {have}, need {need}")]
    InsufficientData {
        symbol: String,
        timeframe: String,
        have: usize,
        need: usize,
    },

    /// Network/timeout error from the candle fetcher. Retried at the next
    /// scheduled close.
    #[error("transient fetcher error for {symbol}/{timeframe}: {source}")]
    FetcherTransient {
        symbol: String,
        timeframe: String,
        #[source]
        source: anyhow::Error,
    },

    /// Authentication or permanent fetcher failure. Surfaced to the
    /// supervisor; the orchestrator for this key stops.
    #[error("fatal fetcher error for {symbol}/{timeframe}: {source}")]
    FetcherFatal {
        symbol: String,
        timeframe: String,
        #[source]
        source: anyhow::Error,
    },

    /// The sink declined to publish a signal but may accept it on replay.
    /// The CHoCH lock is NOT cleared so the signal is not re-fired.
    #[error("transient sink error publishing signal for {symbol}/{timeframe}: {source}")]
    SinkTransient {
        symbol: String,
        timeframe: String,
        #[source]
        source: anyhow::Error,
    },

    /// The sink failed permanently. The orchestrator for this key stops.
    #[error("fatal sink error publishing signal for {symbol}/{timeframe}: {source}")]
    SinkFatal {
        symbol: String,
        timeframe: String,
        #[source]
        source: anyhow::Error,
    },

    /// Reserved for an invariant violation inside the confirmer that would
    /// indicate a validator bug rather than a market condition — e.g. a
    /// group tag unset on a pattern reaching `ChochConfirmer::confirm`.
    /// Currently unreachable: `EightPivotPattern::group` is a non-optional
    /// `Group`, so no pattern can reach the confirmer without one set. Kept
    /// for the day a genuine pre-confirm invariant check is added, rather
    /// than widening `Group` to `Option` just to give this variant a path.
    #[error("logic assertion failed for {symbol}/{timeframe}: {reason}")]
    LogicAssertion {
        symbol: String,
        timeframe: String,
        reason: String,
    },
}

impl EngineError {
    /// Whether this error should be skipped silently (logged, no retry
    /// scheduling beyond the normal next-close cadence).
    pub fn is_skip_and_continue(&self) -> bool {
        matches!(
            self,
            EngineError::InputMalformed { .. }
                | EngineError::InsufficientData { .. }
                | EngineError::FetcherTransient { .. }
                | EngineError::LogicAssertion { .. }
        )
    }

    /// Whether this error must stop the orchestrator for its key.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::FetcherFatal { .. } | EngineError::SinkFatal { .. }
        )
    }
}
