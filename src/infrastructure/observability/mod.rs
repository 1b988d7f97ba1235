//! Push-based observability: outbound data only, no HTTP server, no
//! incoming requests. Structured JSON logs to stdout plus an in-process
//! Prometheus registry a Pushgateway sidecar can scrape or receive from.

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
