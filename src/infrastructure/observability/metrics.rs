//! Prometheus metrics definitions for the CHoCH engine.
//!
//! All metrics use the `choch_` prefix. Push-based only: nothing here opens
//! an inbound HTTP listener, `render()` is read by the reporter and logged.

use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Total scan cycles run, by (symbol, timeframe).
    pub scans_total: CounterVec,
    /// Total signals fired, by (timeframe, direction, group).
    pub signals_total: CounterVec,
    /// Total declined scans, by (timeframe, error_kind).
    pub declined_total: CounterVec,
    /// Scan latency in seconds, by timeframe.
    pub scan_latency_seconds: HistogramVec,
    /// Number of active (symbol, timeframe) keys.
    pub active_keys: GenericGauge<AtomicF64>,
    /// Uptime in seconds.
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let scans_total = CounterVec::new(
            Opts::new("choch_scans_total", "Total scan cycles run"),
            &["symbol", "timeframe"],
        )?;
        registry.register(Box::new(scans_total.clone()))?;

        let signals_total = CounterVec::new(
            Opts::new("choch_signals_total", "Total CHoCH signals fired"),
            &["timeframe", "direction", "group"],
        )?;
        registry.register(Box::new(signals_total.clone()))?;

        let declined_total = CounterVec::new(
            Opts::new("choch_declined_total", "Total declined scans by error kind"),
            &["timeframe", "error_kind"],
        )?;
        registry.register(Box::new(declined_total.clone()))?;

        let scan_latency_seconds = HistogramVec::new(
            HistogramOpts::new("choch_scan_latency_seconds", "Scan cycle latency in seconds")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["timeframe"],
        )?;
        registry.register(Box::new(scan_latency_seconds.clone()))?;

        let active_keys = Gauge::with_opts(Opts::new(
            "choch_active_keys",
            "Number of active (symbol, timeframe) worker keys",
        ))?;
        registry.register(Box::new(active_keys.clone()))?;

        let uptime_seconds =
            Gauge::with_opts(Opts::new("choch_uptime_seconds", "Server uptime in seconds"))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            scans_total,
            signals_total,
            declined_total,
            scan_latency_seconds,
            active_keys,
            uptime_seconds,
        })
    }

    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_scan(&self, symbol: &str, timeframe: &str) {
        self.scans_total.with_label_values(&[symbol, timeframe]).inc();
    }

    pub fn inc_signal(&self, timeframe: &str, direction: &str, group: &str) {
        self.signals_total
            .with_label_values(&[timeframe, direction, group])
            .inc();
    }

    pub fn inc_declined(&self, timeframe: &str, error_kind: &str) {
        self.declined_total
            .with_label_values(&[timeframe, error_kind])
            .inc();
    }

    pub fn observe_scan_latency(&self, timeframe: &str, seconds: f64) {
        self.scan_latency_seconds
            .with_label_values(&[timeframe])
            .observe(seconds);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("failed to construct default Metrics")
    }
}
