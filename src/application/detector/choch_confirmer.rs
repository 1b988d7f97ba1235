//! CHoCH Confirmer.
//!
//! Tests the three most recent closed candles — pre-CHoCH, CHoCH, and
//! confirmation — against the most recently validated eight-pivot pattern,
//! and fires at most one signal per pattern via the lock on `TimeframeState`.

use crate::domain::market::candle::Candle;
use crate::domain::market::pattern::{Direction, EightPivotPattern, Group};
use crate::domain::market::signal::{DetectionResult, Signal};
use crate::domain::market::state::TimeframeState;
use crate::domain::market::timeframe::Timeframe;
use rust_decimal::Decimal;

pub struct ChochConfirmer;

impl ChochConfirmer {
    /// `cur_bar_idx` is the confirmation candle's position in the window the
    /// pattern was validated against; the pattern only applies to candles
    /// strictly newer than its own last pivot bar.
    pub fn confirm(
        symbol: &str,
        timeframe: Timeframe,
        state: &mut TimeframeState,
        pre: &Candle,
        mid: &Candle,
        cur: &Candle,
        cur_bar_idx: usize,
    ) -> DetectionResult {
        let Some(pattern) = state.last_pattern else {
            return DetectionResult::none();
        };
        if state.choch_locked || cur_bar_idx <= pattern.last_bar_idx {
            return DetectionResult::none();
        }

        let direction = match pattern.direction {
            // A validated downtrend pattern reverses upward; a validated
            // uptrend pattern reverses downward.
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
        };

        let confirmed = match direction {
            Direction::Up => Self::base_up(&pattern, pre, mid)
                && Self::basic_up(&pattern, pre, cur)
                && Self::group_price_up(&pattern, cur)
                && Self::volume_up(&pattern, mid),
            Direction::Down => Self::base_down(&pattern, pre, mid)
                && Self::basic_down(&pattern, pre, cur)
                && Self::group_price_down(&pattern, cur)
                && Self::volume_down(&pattern, mid),
        };

        if !confirmed {
            return DetectionResult::none();
        }

        state.lock(pattern.last_bar_open_time);
        let signal = Signal {
            symbol: symbol.to_string(),
            timeframe,
            direction,
            group: pattern.group,
            price: mid.close,
            signal_time: cur.open_time,
            pattern_pivot_prices: pattern.prices,
            pattern_bar_indices: pattern.bar_indices,
        };
        DetectionResult::fired(signal)
    }

    fn base_up(pattern: &EightPivotPattern, pre: &Candle, mid: &Candle) -> bool {
        mid.low > pre.low
            && mid.close > pre.high
            && mid.close > pattern.p6_ref
            && mid.close < pattern.p2_ref
    }

    fn base_down(pattern: &EightPivotPattern, pre: &Candle, mid: &Candle) -> bool {
        mid.high < pre.high
            && mid.close < pre.low
            && mid.close < pattern.p6_ref
            && mid.close > pattern.p2_ref
    }

    fn basic_up(pattern: &EightPivotPattern, pre: &Candle, cur: &Candle) -> bool {
        cur.low > pre.high && cur.close <= pattern.p2_ref
    }

    fn basic_down(pattern: &EightPivotPattern, pre: &Candle, cur: &Candle) -> bool {
        cur.high < pre.low && cur.close >= pattern.p2_ref
    }

    fn group_price_up(pattern: &EightPivotPattern, cur: &Candle) -> bool {
        match pattern.group {
            Group::G1 | Group::G3 => cur.close <= pattern.p(5),
            Group::G2 => cur.close <= pattern.p(7),
        }
    }

    fn group_price_down(pattern: &EightPivotPattern, cur: &Candle) -> bool {
        match pattern.group {
            Group::G1 | Group::G3 => cur.close >= pattern.p(5),
            Group::G2 => cur.close >= pattern.p(7),
        }
    }

    fn volume_up(pattern: &EightPivotPattern, mid: &Candle) -> bool {
        Self::volume_common(pattern, mid.volume)
    }

    fn volume_down(pattern: &EightPivotPattern, mid: &Candle) -> bool {
        Self::volume_common(pattern, mid.volume)
    }

    fn volume_common(pattern: &EightPivotPattern, v_mid: Decimal) -> bool {
        let v = |n: usize| pattern.v(n);
        match pattern.group {
            Group::G1 => {
                let a = Self::max3(v(6), v(7), v(8));
                let cond_a = a == v(6) || a == v(8) || a == v_mid;
                let b = Self::max3(v(4), v(5), v(6));
                let cond_b = b == v(4) || b == v(6);
                let c = [v(4), v(5), v(6), v(7), v(8)]
                    .into_iter()
                    .fold(Decimal::MIN, Decimal::max);
                let cond_c = c == v(8) || c == v_mid;
                (cond_a && cond_b) || cond_c
            }
            Group::G2 | Group::G3 => {
                let m = Self::max3(v(4), v(5), v(6));
                m == v(4) || m == v(5) || m == v_mid
            }
        }
    }

    fn max3(a: Decimal, b: Decimal, c: Decimal) -> Decimal {
        a.max(b).max(c)
    }
}
