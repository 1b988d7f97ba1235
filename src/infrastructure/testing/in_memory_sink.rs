//! In-memory `SignalSink`: records every published signal for assertions.

use crate::domain::errors::EngineError;
use crate::domain::market::signal::Signal;
use crate::domain::ports::SignalSink;
use async_trait::async_trait;
use tokio::sync::RwLock;

pub struct InMemorySignalSink {
    published: RwLock<Vec<Signal>>,
}

impl InMemorySignalSink {
    pub fn new() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
        }
    }

    pub async fn published(&self) -> Vec<Signal> {
        self.published.read().await.clone()
    }
}

impl Default for InMemorySignalSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalSink for InMemorySignalSink {
    async fn publish(&self, signal: &Signal) -> Result<(), EngineError> {
        self.published.write().await.push(signal.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::pattern::{Direction, Group};
    use crate::domain::market::timeframe::Timeframe;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn publish_records_signal() {
        let sink = InMemorySignalSink::new();
        let signal = Signal {
            symbol: "BTCUSDT".to_string(),
            timeframe: Timeframe::FiveMin,
            direction: Direction::Up,
            group: Group::G1,
            price: dec!(99.0),
            signal_time: 0,
            pattern_pivot_prices: [dec!(1); 8],
            pattern_bar_indices: [0; 8],
        };
        sink.publish(&signal).await.unwrap();
        assert_eq!(sink.published().await.len(), 1);
    }
}
