//! Push-based metrics reporter: periodically logs a structured JSON
//! snapshot to stdout. No HTTP server, no incoming connections.

use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub active_keys: usize,
}

pub struct MetricsReporter {
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
    active_keys: usize,
}

impl MetricsReporter {
    pub fn new(metrics: Metrics, interval: Duration, active_keys: usize) -> Self {
        Self {
            metrics,
            start_time: Instant::now(),
            interval,
            active_keys,
        }
    }

    pub async fn run(self) {
        info!(
            interval = ?self.interval,
            "MetricsReporter starting push-based metrics (JSON to stdout)"
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let snapshot = self.collect_snapshot();
            self.metrics.uptime_seconds.set(snapshot.uptime_seconds as f64);
            self.metrics.active_keys.set(self.active_keys as f64);

            match serde_json::to_string(&snapshot) {
                Ok(json) => println!("METRICS_JSON:{}", json),
                Err(e) => warn!("failed to serialize metrics snapshot: {}", e),
            }
        }
    }

    fn collect_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            active_keys: self.active_keys,
        }
    }
}
