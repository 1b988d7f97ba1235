//! Configuration module for the CHoCH engine.
//!
//! Loads process-wide configuration from environment variables, following
//! a per-domain `*EnvConfig::from_env()` convention. Every key is optional
//! and falls back to a documented default.

use crate::domain::market::pivot::VariantFilter;
use crate::domain::market::timeframe::Timeframe;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolSelector {
    All,
    List(Vec<String>),
}

/// Main engine configuration, aggregating the detection tuning knobs plus
/// the ambient concerns (database URL, log level, tick cadence) needed to
/// run the process.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub symbols: SymbolSelector,
    pub timeframes: Vec<Timeframe>,

    pub pivot_left: usize,
    pub pivot_right: usize,
    pub keep_pivots: usize,
    pub use_variant_filter: bool,
    pub variant_filter: VariantFilter,
    pub window_size: usize,
    pub scan_grace: Duration,

    // Ambient
    pub database_url: String,
    pub scheduler_tick_interval: Duration,
    pub observability_enabled: bool,
    pub observability_interval: Duration,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let symbols = match env::var("SYMBOLS") {
            Ok(s) if s.trim().eq_ignore_ascii_case("ALL") || s.trim().is_empty() => {
                SymbolSelector::All
            }
            Ok(s) => SymbolSelector::List(
                s.split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect(),
            ),
            Err(_) => SymbolSelector::All,
        };

        let timeframes = match env::var("TIMEFRAMES") {
            Ok(s) if !s.trim().is_empty() => s
                .split(',')
                .map(|p| Timeframe::from_str(p.trim()))
                .collect::<Result<Vec<_>>>()
                .context("Invalid TIMEFRAMES")?,
            _ => vec![
                Timeframe::FiveMin,
                Timeframe::FifteenMin,
                Timeframe::ThirtyMin,
                Timeframe::OneHour,
            ],
        };

        let pivot_left = env_parse("PIVOT_LEFT", 1usize)?;
        let pivot_right = env_parse("PIVOT_RIGHT", 1usize)?;
        let keep_pivots = env_parse("KEEP_PIVOTS", 200usize)?;
        let use_variant_filter = env_parse_bool("USE_VARIANT_FILTER", true)?;
        let variant_filter = VariantFilter {
            allow_ph1: env_parse_bool("ALLOW_PH1", true)?,
            allow_ph2: env_parse_bool("ALLOW_PH2", true)?,
            allow_ph3: env_parse_bool("ALLOW_PH3", true)?,
            allow_pl1: env_parse_bool("ALLOW_PL1", true)?,
            allow_pl2: env_parse_bool("ALLOW_PL2", true)?,
            allow_pl3: env_parse_bool("ALLOW_PL3", true)?,
        };
        let window_size = env_parse("WINDOW_SIZE", 50usize)?;
        let scan_grace = Duration::from_secs(env_parse("SCAN_GRACE_SECONDS", 30u64)?);

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://choch.db".to_string());
        let scheduler_tick_interval =
            Duration::from_secs(env_parse("SCHEDULER_TICK_SECONDS", 1u64)?);
        let observability_enabled = env_parse_bool("OBSERVABILITY_ENABLED", true)?;
        let observability_interval =
            Duration::from_secs(env_parse("OBSERVABILITY_INTERVAL", 60u64)?);

        Ok(Self {
            symbols,
            timeframes,
            pivot_left,
            pivot_right,
            keep_pivots,
            use_variant_filter,
            variant_filter,
            window_size,
            scan_grace,
            database_url,
            scheduler_tick_interval,
            observability_enabled,
            observability_interval,
        })
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn env_parse_bool(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(v) => match v.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("Invalid {key}: '{other}'"),
        },
        Err(_) => Ok(default),
    }
}
