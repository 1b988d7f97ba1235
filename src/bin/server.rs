//! CHoCH Engine Server — headless pattern-detection engine.
//!
//! Runs the scheduler + per-(symbol, timeframe) orchestrator workers until
//! a shutdown signal. No GUI, no inbound HTTP — metrics are pushed as
//! structured JSON logs to stdout.
//!
//! The exchange fetcher and the signal sink are external collaborators
//! reached only through the `CandleFetcher`/`SignalSink` traits; this
//! binary wires in the in-memory test doubles as a running default. Swap
//! them for a real exchange client and alerting sink at this composition
//! root.

use anyhow::Result;
use choch_engine::application::agents::key_worker;
use choch_engine::application::agents::orchestrator::Orchestrator;
use choch_engine::application::agents::scheduler_loop::SchedulerLoop;
use choch_engine::application::detector::pivot_detector::PivotDetector;
use choch_engine::config::{EngineConfig, SymbolSelector};
use choch_engine::infrastructure::observability::{Metrics, MetricsReporter};
use choch_engine::infrastructure::persistence::{Database, SqliteAlertRepository};
use choch_engine::infrastructure::testing::{InMemoryCandleFetcher, InMemorySignalSink};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("CHoCH Engine {} starting...", env!("CARGO_PKG_VERSION"));
    info!("Mode: HEADLESS (no UI, no HTTP server)");

    let config = EngineConfig::from_env()?;
    info!(
        timeframes = ?config.timeframes,
        window_size = config.window_size,
        "configuration loaded"
    );

    let symbols = match &config.symbols {
        SymbolSelector::All => vec!["BTCUSDT".to_string()],
        SymbolSelector::List(list) => list.clone(),
    };

    let database = Database::new(&config.database_url).await?;
    let repository = Arc::new(SqliteAlertRepository::new(database));
    let fetcher = Arc::new(InMemoryCandleFetcher::new());
    let sink = Arc::new(InMemorySignalSink::new());

    let mut triggers = HashMap::new();
    for symbol in &symbols {
        for &timeframe in &config.timeframes {
            let orchestrator = Orchestrator::new(
                symbol.clone(),
                timeframe,
                fetcher.clone(),
                sink.clone(),
                Some(repository.clone()),
                PivotDetector::new(
                    config.pivot_left,
                    config.pivot_right,
                    config.use_variant_filter,
                    config.variant_filter,
                ),
                config.window_size,
                config.keep_pivots,
            );

            let (tx, rx) = mpsc::channel(1);
            triggers.insert((symbol.clone(), timeframe), tx);

            let worker_symbol = symbol.clone();
            tokio::spawn(key_worker::run(worker_symbol, timeframe, orchestrator, rx));
        }
    }

    let active_keys = triggers.len();
    let scheduler_loop = SchedulerLoop::new(
        config.timeframes.clone(),
        symbols.clone(),
        config.scan_grace,
        config.scheduler_tick_interval,
        triggers,
    );
    tokio::spawn(scheduler_loop.run());

    if config.observability_enabled {
        let metrics = Metrics::new()?;
        let reporter = MetricsReporter::new(metrics, config.observability_interval, active_keys);
        tokio::spawn(reporter.run());
        info!(interval = ?config.observability_interval, "metrics reporter started");
    }

    info!(keys = active_keys, "server running, press Ctrl+C to shut down");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, exiting");

    Ok(())
}
