//! Eight-Pivot Validator.
//!
//! Given the last eight stored pivots, decides whether they form a valid
//! up or down pattern and, if so, which of the three mutually exclusive
//! group orderings it belongs to. Precedence is G1 > G2 > G3: evaluated in
//! that order, the first satisfied wins.

use crate::domain::market::candle::Candle;
use crate::domain::market::pattern::{Direction, EightPivotPattern, Group};
use crate::domain::market::pivot::{Pivot, PivotKind};
use rust_decimal::Decimal;

const UPTREND_KINDS: [PivotKind; 8] = [
    PivotKind::Low,
    PivotKind::High,
    PivotKind::Low,
    PivotKind::High,
    PivotKind::Low,
    PivotKind::High,
    PivotKind::Low,
    PivotKind::High,
];

const DOWNTREND_KINDS: [PivotKind; 8] = [
    PivotKind::High,
    PivotKind::Low,
    PivotKind::High,
    PivotKind::Low,
    PivotKind::High,
    PivotKind::Low,
    PivotKind::High,
    PivotKind::Low,
];

pub struct EightPivotValidator;

impl EightPivotValidator {
    pub fn validate(pivots: &[Pivot; 8], candles: &[Candle]) -> Option<EightPivotPattern> {
        let kinds: [PivotKind; 8] = std::array::from_fn(|i| pivots[i].kind);

        let direction = if kinds == UPTREND_KINDS {
            Direction::Up
        } else if kinds == DOWNTREND_KINDS {
            Direction::Down
        } else {
            return None;
        };

        let p = |n: usize| pivots[n - 1].price;
        let prices: [Decimal; 8] = std::array::from_fn(|i| pivots[i].price);

        let extreme_ok = match direction {
            Direction::Up => p(8) == prices.iter().copied().fold(Decimal::MIN, Decimal::max),
            Direction::Down => p(8) == prices.iter().copied().fold(Decimal::MAX, Decimal::min),
        };

        let retest_ok = match direction {
            Direction::Up => p(7) < p(4),
            Direction::Down => p(7) > p(4),
        };

        let breakout_ok = match direction {
            Direction::Up => p(5) > p(2) && p(3) > p(1),
            Direction::Down => p(5) < p(2) && p(3) < p(1),
        };

        if !(extreme_ok && retest_ok && breakout_ok) {
            return None;
        }

        let group = Self::select_group(direction, &p)?;

        let bar_indices: [usize; 8] = std::array::from_fn(|i| pivots[i].bar_index);
        let volumes: [Decimal; 8] =
            std::array::from_fn(|i| candles[pivots[i].bar_index].volume);

        Some(EightPivotPattern {
            direction,
            group,
            prices,
            bar_indices,
            volumes,
            p2_ref: p(2),
            p5_ref: p(5),
            p6_ref: p(6),
            last_bar_idx: pivots[7].bar_index,
            last_bar_open_time: candles[pivots[7].bar_index].open_time,
        })
    }

    fn select_group(direction: Direction, p: &impl Fn(usize) -> Decimal) -> Option<Group> {
        match direction {
            Direction::Up => {
                if p(2) < p(4) && p(4) < p(6) && p(6) < p(8) && p(3) < p(5) && p(5) < p(7) {
                    Some(Group::G1)
                } else if p(3) < p(7)
                    && p(7) < p(5)
                    && p(2) < p(6)
                    && p(6) < p(4)
                    && p(4) < p(8)
                    && p(2) < p(5)
                {
                    Some(Group::G2)
                } else if p(3) < p(5)
                    && p(5) < p(7)
                    && p(2) < p(6)
                    && p(6) < p(4)
                    && p(4) < p(8)
                    && p(2) < p(5)
                {
                    Some(Group::G3)
                } else {
                    None
                }
            }
            Direction::Down => {
                if p(2) > p(4) && p(4) > p(6) && p(6) > p(8) && p(3) > p(5) && p(5) > p(7) {
                    Some(Group::G1)
                } else if p(3) > p(7)
                    && p(7) > p(5)
                    && p(2) > p(6)
                    && p(6) > p(4)
                    && p(4) > p(8)
                    && p(2) > p(5)
                {
                    Some(Group::G2)
                } else if p(3) > p(5)
                    && p(5) > p(7)
                    && p(2) > p(6)
                    && p(6) > p(4)
                    && p(4) > p(8)
                    && p(2) > p(5)
                {
                    Some(Group::G3)
                } else {
                    None
                }
            }
        }
    }
}
