//! Timeframe Scheduler.
//!
//! Decides, at wall-clock `now`, which configured timeframes have a newly
//! closed candle eligible for scanning. Uses the exact same alignment
//! (`Timeframe::alignment`) the aggregator uses, so a scan is triggered
//! precisely when the candle the aggregator would also produce has closed.

use crate::domain::market::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

pub struct TimeframeScheduler {
    last_scanned_close_time: HashMap<Timeframe, i64>,
    grace: Duration,
}

impl TimeframeScheduler {
    pub fn new(grace: Duration) -> Self {
        Self {
            last_scanned_close_time: HashMap::new(),
            grace,
        }
    }

    /// Returns the set of timeframes, among `configured`, that have a newly
    /// closed candle ready to scan at `now`. Updates internal bookkeeping
    /// so the same close is never returned twice (coalescing: however many
    /// ticks land between two closes, only the first one after the grace
    /// period fires).
    pub fn get_scannable(&mut self, configured: &[Timeframe], now: DateTime<Utc>) -> Vec<Timeframe> {
        let now_secs = now.timestamp();
        let grace_secs = self.grace.as_secs() as i64;

        let mut ready = Vec::new();
        for &tf in configured {
            let close_time = tf.alignment().close_time_at_or_before(now_secs);
            let last = *self.last_scanned_close_time.get(&tf).unwrap_or(&i64::MIN);

            if close_time > last && now_secs >= close_time + grace_secs {
                self.last_scanned_close_time.insert(tf, close_time);
                ready.push(tf);
            }
        }
        ready
    }

    #[cfg(test)]
    pub fn last_scanned_close_time(&self, tf: Timeframe) -> Option<i64> {
        self.last_scanned_close_time.get(&tf).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn grace_period_delays_scan_until_elapsed() {
        // now=10:05:12, last_scanned_close=10:00:00, close at 10:05:00,
        // grace=30s -> not yet scannable at 10:05:12, but is at 10:05:35,
        // after which last_scanned_close_time becomes 10:05:00.
        let mut scheduler = TimeframeScheduler::new(Duration::from_secs(30));
        let tf = Timeframe::FiveMin;

        let day = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        // Prime the bookkeeping so "last scanned" is 10:00:00 (must itself
        // be past the grace window relative to the 10:00:00 close).
        scheduler.get_scannable(&[tf], day + chrono::Duration::seconds(35));

        let almost = day + chrono::Duration::seconds(5 * 60 + 12);
        assert!(scheduler.get_scannable(&[tf], almost).is_empty());

        let ready_at = day + chrono::Duration::seconds(5 * 60 + 35);
        let ready = scheduler.get_scannable(&[tf], ready_at);
        assert_eq!(ready, vec![tf]);
        assert_eq!(
            scheduler.last_scanned_close_time(tf),
            Some((day + chrono::Duration::seconds(5 * 60)).timestamp())
        );
    }

    #[test]
    fn coalesces_missed_ticks_into_one_scan() {
        let mut scheduler = TimeframeScheduler::new(Duration::from_secs(0));
        let tf = Timeframe::FiveMin;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        // Simulate many ticks landing inside the same closed period.
        let mut fired = 0;
        for secs in 0..300 {
            let now = base + chrono::Duration::seconds(secs);
            if !scheduler.get_scannable(&[tf], now).is_empty() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn twenty_five_min_scannable_uses_reference_alignment() {
        let mut scheduler = TimeframeScheduler::new(Duration::from_secs(0));
        let tf = Timeframe::TwentyFiveMin;
        let reference_secs = tf.alignment().reference_secs();
        let reference = Utc.timestamp_opt(reference_secs, 0).unwrap();

        let at_boundary = reference + chrono::Duration::seconds(25 * 60);
        let ready = scheduler.get_scannable(&[tf], at_boundary);
        assert_eq!(ready, vec![tf]);
    }
}
