//! Closed OHLCV candle, the base unit the whole engine operates on.

use crate::domain::errors::EngineError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A closed bar. Never represents a candle still in formation — the
/// fetcher contract guarantees that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time of the bar, unix seconds UTC.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// Construct a candle, validating the OHLC invariant. Returns
    /// `InputMalformed` rather than panicking so a bad tick from an
    /// external fetcher degrades to a skipped scan.
    pub fn new(
        symbol: &str,
        open_time: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Result<Self, EngineError> {
        let candle = Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        };
        candle.validate(symbol)?;
        Ok(candle)
    }

    fn validate(&self, symbol: &str) -> Result<(), EngineError> {
        let body_min = self.open.min(self.close);
        let body_max = self.open.max(self.close);

        if self.volume < Decimal::ZERO {
            return Err(EngineError::InputMalformed {
                symbol: symbol.to_string(),
                open_time: self.open_time,
                reason: format!("negative volume {}", self.volume),
            });
        }
        if !(self.low <= body_min && body_max <= self.high) {
            return Err(EngineError::InputMalformed {
                symbol: symbol.to_string(),
                open_time: self.open_time,
                reason: format!(
                    "OHLC invariant violated: low={} open={} close={} high={}",
                    self.low, self.open, self.close, self.high
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn valid_candle_constructs() {
        let c = Candle::new("BTCUSDT", 0, dec!(10), dec!(12), dec!(9), dec!(11), dec!(5));
        assert!(c.is_ok());
    }

    #[test]
    fn high_below_body_is_malformed() {
        let c = Candle::new("BTCUSDT", 0, dec!(10), dec!(10.5), dec!(9), dec!(11), dec!(5));
        assert!(matches!(c, Err(EngineError::InputMalformed { .. })));
    }

    #[test]
    fn negative_volume_is_malformed() {
        let c = Candle::new("BTCUSDT", 0, dec!(10), dec!(12), dec!(9), dec!(11), dec!(-1));
        assert!(matches!(c, Err(EngineError::InputMalformed { .. })));
    }
}
