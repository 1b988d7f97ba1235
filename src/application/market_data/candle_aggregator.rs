//! Aligned Candle Aggregator.
//!
//! A pure function mapping a sequence of closed 5m candles to closed
//! candles at an aggregated timeframe (10m/20m/25m/40m/50m), grouped by a
//! fixed reference instant rather than midnight, so the boundaries stay
//! consistent with the Timeframe Scheduler's alignment.

use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub struct CandleAggregator;

impl CandleAggregator {
    /// Aggregate closed 5m candles (already ordered, already closed) into
    /// closed candles at `timeframe`. Partial groups — periods for which
    /// fewer than `timeframe.base_multiplier()` 5m candles are present —
    /// are dropped rather than interpolated. Output is ordered ascending by
    /// open time.
    pub fn aggregate(base_candles: &[Candle], timeframe: Timeframe) -> Vec<Candle> {
        debug_assert!(timeframe.is_aggregated());
        let alignment = timeframe.alignment();
        let expected_members = timeframe.base_multiplier() as usize;

        let mut groups: BTreeMap<i64, Vec<Candle>> = BTreeMap::new();
        for candle in base_candles {
            let period_start = alignment.period_start(candle.open_time);
            groups.entry(period_start).or_default().push(*candle);
        }

        let mut out = Vec::new();
        for (period_start, members) in groups {
            if members.len() != expected_members {
                continue;
            }
            out.push(Self::merge(period_start, &members));
        }
        out
    }

    fn merge(period_start: i64, members: &[Candle]) -> Candle {
        let open = members.first().expect("non-empty group").open;
        let close = members.last().expect("non-empty group").close;
        let high = members
            .iter()
            .map(|c| c.high)
            .fold(Decimal::MIN, Decimal::max);
        let low = members
            .iter()
            .map(|c| c.low)
            .fold(Decimal::MAX, Decimal::min);
        let volume = members.iter().map(|c| c.volume).sum();

        Candle {
            open_time: period_start,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn candle(open_time: i64, o: i64, h: i64, l: i64, c: i64, v: i64) -> Candle {
        Candle::new(
            "BTCUSDT",
            open_time,
            Decimal::from(o),
            Decimal::from(h),
            Decimal::from(l),
            Decimal::from(c),
            Decimal::from(v),
        )
        .unwrap()
    }

    #[test]
    fn five_complete_5m_candles_aggregate_to_one_25m_candle() {
        let base = Timeframe::TwentyFiveMin.alignment().reference_secs();
        let candles: Vec<Candle> = (0..5)
            .map(|i| candle(base + i * 300, 100 + i, 110 + i, 95 + i, 105 + i, 10))
            .collect();

        let out = CandleAggregator::aggregate(&candles, Timeframe::TwentyFiveMin);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].open_time, base);
        assert_eq!(out[0].open, dec!(100));
        assert_eq!(out[0].close, dec!(109));
        assert_eq!(out[0].high, dec!(114));
        assert_eq!(out[0].low, dec!(95));
        assert_eq!(out[0].volume, dec!(50));
    }

    #[test]
    fn partial_group_is_dropped() {
        let base = Timeframe::TenMin.alignment().reference_secs();
        let candles = vec![candle(base, 1, 2, 0, 1, 1)];
        let out = CandleAggregator::aggregate(&candles, Timeframe::TenMin);
        assert!(out.is_empty());
    }

    #[test]
    fn output_candles_land_on_reference_arithmetic_progression() {
        let tf = Timeframe::TwentyFiveMin;
        let reference = tf.alignment().reference_secs();
        let mut candles = Vec::new();
        for period in 0..3 {
            let period_start = reference + period * 25 * 60;
            for i in 0..5 {
                candles.push(candle(
                    period_start + i * 300,
                    100,
                    105,
                    95,
                    100,
                    1,
                ));
            }
        }
        let out = CandleAggregator::aggregate(&candles, tf);
        assert_eq!(out.len(), 3);
        for c in &out {
            assert_eq!((c.open_time - reference).rem_euclid(25 * 60), 0);
        }
    }

    #[test]
    fn aggregation_across_midnight_25m_five_periods() {
        // 2025-10-25 23:30 through 2025-10-26 01:10, reference 2025-10-24
        // 17:05, interval 25m. Boundaries: 23:30, 23:55, 00:20, 00:45,
        // 01:10 — none aligned to midnight.
        let tf = Timeframe::TwentyFiveMin;
        let start = Utc.with_ymd_and_hms(2025, 10, 25, 23, 30, 0).unwrap().timestamp();
        let mut candles = Vec::new();
        for i in 0..20 {
            candles.push(candle(start + i * 300, 100, 101, 99, 100, 1));
        }
        let out = CandleAggregator::aggregate(&candles, tf);
        assert_eq!(out.len(), 4);
        let midnight = Utc.with_ymd_and_hms(2025, 10, 26, 0, 0, 0).unwrap().timestamp();
        assert!(out.iter().all(|c| c.open_time != midnight));
    }
}
