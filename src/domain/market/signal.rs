//! The Signal leaving the engine by value to the sink.

use super::pattern::{Direction, Group};
use super::timeframe::Timeframe;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub direction: Direction,
    pub group: Group,
    pub price: Decimal,
    /// Unix seconds UTC, the confirmation candle's open time.
    pub signal_time: i64,
    pub pattern_pivot_prices: [Decimal; 8],
    pub pattern_bar_indices: [usize; 8],
}

/// Outcome of a single scan, independent of whether it fired a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub fired: bool,
    pub signal: Option<Signal>,
}

impl DetectionResult {
    pub fn none() -> Self {
        Self {
            fired: false,
            signal: None,
        }
    }

    pub fn fired(signal: Signal) -> Self {
        Self {
            fired: true,
            signal: Some(signal),
        }
    }
}
