//! Ticks the Timeframe Scheduler and fans out scan triggers to the per-key
//! workers. Each configured (symbol, timeframe) pair has its own
//! bounded(1) `mpsc` sender; a full channel means a scan is already queued
//! for that key, so the tick is simply dropped (coalescing).

use crate::application::market_data::timeframe_scheduler::TimeframeScheduler;
use crate::domain::market::timeframe::Timeframe;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::time;
use tracing::debug;

pub struct SchedulerLoop {
    scheduler: TimeframeScheduler,
    configured_timeframes: Vec<Timeframe>,
    symbols: Vec<String>,
    tick_interval: Duration,
    triggers: HashMap<(String, Timeframe), Sender<()>>,
}

impl SchedulerLoop {
    pub fn new(
        configured_timeframes: Vec<Timeframe>,
        symbols: Vec<String>,
        grace: Duration,
        tick_interval: Duration,
        triggers: HashMap<(String, Timeframe), Sender<()>>,
    ) -> Self {
        Self {
            scheduler: TimeframeScheduler::new(grace),
            configured_timeframes,
            symbols,
            tick_interval,
            triggers,
        }
    }

    pub async fn run(mut self) {
        let mut ticker = time::interval(self.tick_interval);
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now();
            let ready = self.scheduler.get_scannable(&self.configured_timeframes, now);
            for tf in ready {
                for symbol in &self.symbols {
                    if let Some(tx) = self.triggers.get(&(symbol.clone(), tf))
                        && tx.try_send(()).is_err()
                    {
                        debug!(symbol = %symbol, timeframe = %tf, "scan trigger dropped, previous scan still pending");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn tick_without_ready_timeframe_sends_nothing() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut triggers = HashMap::new();
        triggers.insert(("BTCUSDT".to_string(), Timeframe::FiveMin), tx);

        let mut loop_ = SchedulerLoop::new(
            vec![Timeframe::FiveMin],
            vec!["BTCUSDT".to_string()],
            Duration::from_secs(30),
            Duration::from_millis(1),
            triggers,
        );

        // A single tick at an arbitrary "now" is scannable at most once;
        // draining the scheduler state directly avoids real-time waits.
        let now = chrono::Utc::now();
        let ready = loop_.scheduler.get_scannable(&loop_.configured_timeframes, now);
        if ready.is_empty() {
            assert!(rx.try_recv().is_err());
        }
    }
}
