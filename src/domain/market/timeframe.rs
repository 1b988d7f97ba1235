//! Timeframe identifiers and the alignment rules shared by the aggregator
//! and the scheduler.
//!
//! Native timeframes (5m/15m/30m/1h) align to UTC midnight. Aggregated
//! timeframes (10m/20m/25m/40m/50m) are built from a 5m base stream and
//! align to a fixed reference instant instead, because several of them
//! (25m in particular) do not divide 1440 minutes — midnight anchoring
//! would drift their boundaries across days.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    FiveMin,
    TenMin,
    FifteenMin,
    TwentyMin,
    TwentyFiveMin,
    ThirtyMin,
    FortyMin,
    FiftyMin,
    OneHour,
}

use serde::{Deserialize, Serialize};

/// Boundary arithmetic for one timeframe: every period boundary lies on
/// `reference + k * interval` for integer `k`.
#[derive(Debug, Clone, Copy)]
pub struct Alignment {
    reference_secs: i64,
    interval_secs: i64,
}

impl Alignment {
    /// Start-of-period timestamp (unix seconds) for the period containing `t`.
    pub fn period_start(&self, t: i64) -> i64 {
        let idx = (t - self.reference_secs).div_euclid(self.interval_secs);
        self.reference_secs + idx * self.interval_secs
    }

    /// The most recent period-boundary instant `<= now`. Because every
    /// boundary is simultaneously the close of the preceding period and the
    /// open of the next, this is exactly "the most recent close_time <= now".
    pub fn close_time_at_or_before(&self, now: i64) -> i64 {
        self.period_start(now)
    }

    pub fn interval_secs(&self) -> i64 {
        self.interval_secs
    }

    pub fn reference_secs(&self) -> i64 {
        self.reference_secs
    }
}

impl Timeframe {
    pub fn to_minutes(&self) -> i64 {
        match self {
            Timeframe::FiveMin => 5,
            Timeframe::TenMin => 10,
            Timeframe::FifteenMin => 15,
            Timeframe::TwentyMin => 20,
            Timeframe::TwentyFiveMin => 25,
            Timeframe::ThirtyMin => 30,
            Timeframe::FortyMin => 40,
            Timeframe::FiftyMin => 50,
            Timeframe::OneHour => 60,
        }
    }

    /// Aggregated timeframes are synthesized from the 5m base stream by the
    /// Aligned Candle Aggregator; native ones are fetched directly.
    pub fn is_aggregated(&self) -> bool {
        matches!(
            self,
            Timeframe::TenMin
                | Timeframe::TwentyMin
                | Timeframe::TwentyFiveMin
                | Timeframe::FortyMin
                | Timeframe::FiftyMin
        )
    }

    /// Number of 5m base candles that make up one candle of this timeframe.
    /// Only meaningful for aggregated timeframes.
    pub fn base_multiplier(&self) -> i64 {
        self.to_minutes() / 5
    }

    /// Fixed UTC reference instant for aggregated timeframes. Native
    /// timeframes use UTC midnight instead, which is reference instant zero
    /// under the same arithmetic.
    fn reference_instant(&self) -> DateTime<Utc> {
        match self {
            Timeframe::TenMin => Utc.with_ymd_and_hms(2025, 10, 24, 17, 10, 0).unwrap(),
            Timeframe::TwentyMin => Utc.with_ymd_and_hms(2025, 10, 24, 17, 20, 0).unwrap(),
            Timeframe::TwentyFiveMin => Utc.with_ymd_and_hms(2025, 10, 24, 17, 5, 0).unwrap(),
            Timeframe::FortyMin => Utc.with_ymd_and_hms(2025, 10, 24, 16, 40, 0).unwrap(),
            Timeframe::FiftyMin => Utc.with_ymd_and_hms(2025, 10, 20, 0, 0, 0).unwrap(),
            // Native timeframes: UTC epoch is midnight-aligned, so using it
            // as the reference instant reproduces midnight-modular alignment.
            Timeframe::FiveMin | Timeframe::FifteenMin | Timeframe::ThirtyMin | Timeframe::OneHour => {
                Utc.timestamp_opt(0, 0).unwrap()
            }
        }
    }

    /// The alignment rule (reference instant + interval) used by both the
    /// aggregator and the scheduler. Must stay identical between the two to
    /// keep candle boundaries consistent.
    pub fn alignment(&self) -> Alignment {
        Alignment {
            reference_secs: self.reference_instant().timestamp(),
            interval_secs: self.to_minutes() * 60,
        }
    }

    pub fn all_supported() -> Vec<Timeframe> {
        vec![
            Timeframe::FiveMin,
            Timeframe::TenMin,
            Timeframe::FifteenMin,
            Timeframe::TwentyMin,
            Timeframe::TwentyFiveMin,
            Timeframe::ThirtyMin,
            Timeframe::FortyMin,
            Timeframe::FiftyMin,
            Timeframe::OneHour,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::FiveMin => "5m",
            Timeframe::TenMin => "10m",
            Timeframe::FifteenMin => "15m",
            Timeframe::TwentyMin => "20m",
            Timeframe::TwentyFiveMin => "25m",
            Timeframe::ThirtyMin => "30m",
            Timeframe::FortyMin => "40m",
            Timeframe::FiftyMin => "50m",
            Timeframe::OneHour => "1h",
        }
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "5m" => Ok(Timeframe::FiveMin),
            "10m" => Ok(Timeframe::TenMin),
            "15m" => Ok(Timeframe::FifteenMin),
            "20m" => Ok(Timeframe::TwentyMin),
            "25m" => Ok(Timeframe::TwentyFiveMin),
            "30m" => Ok(Timeframe::ThirtyMin),
            "40m" => Ok(Timeframe::FortyMin),
            "50m" => Ok(Timeframe::FiftyMin),
            "1h" => Ok(Timeframe::OneHour),
            other => anyhow::bail!(
                "Invalid timeframe: '{other}'. Valid options: 5m,10m,15m,20m,25m,30m,40m,50m,1h"
            ),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_timeframe_aligns_to_midnight() {
        let tf = Timeframe::FiveMin;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp();
        assert_eq!(tf.alignment().period_start(base), base);
        assert_eq!(tf.alignment().period_start(base + 3 * 60), base);
        assert_eq!(tf.alignment().period_start(base + 5 * 60), base + 5 * 60);
    }

    #[test]
    fn twenty_five_min_aligns_to_reference_not_midnight() {
        let tf = Timeframe::TwentyFiveMin;
        let reference = tf.reference_instant().timestamp();
        assert_eq!(tf.alignment().period_start(reference), reference);
        assert_eq!(
            tf.alignment().period_start(reference + 25 * 60),
            reference + 25 * 60
        );
        // A boundary 25 minutes later does not land on UTC midnight.
        let midnight = Utc.with_ymd_and_hms(2025, 10, 25, 0, 0, 0).unwrap().timestamp();
        assert_ne!((reference - midnight).rem_euclid(86400), 0);
    }

    #[test]
    fn base_multiplier_matches_minutes_over_five() {
        assert_eq!(Timeframe::TwentyFiveMin.base_multiplier(), 5);
        assert_eq!(Timeframe::FiftyMin.base_multiplier(), 10);
    }

    #[test]
    fn from_str_round_trips_label() {
        for tf in Timeframe::all_supported() {
            assert_eq!(Timeframe::from_str(tf.label()).unwrap(), tf);
        }
    }
}
