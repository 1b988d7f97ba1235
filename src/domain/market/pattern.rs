//! The eight-pivot pattern and the three mutually exclusive group
//! orderings a valid pattern can belong to.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Group ordering family. Precedence is G1 > G2 > G3: when an eight-pivot
/// pattern happens to satisfy more than one ordering, the first satisfied
/// in that order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Group {
    G1,
    G2,
    G3,
}

impl Group {
    pub fn label(&self) -> &'static str {
        match self {
            Group::G1 => "G1",
            Group::G2 => "G2",
            Group::G3 => "G3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

/// A validated eight-pivot pattern, bar-ordered P1..P8, retained only long
/// enough for the confirmer to test the following three closed candles
/// against it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EightPivotPattern {
    pub direction: Direction,
    pub group: Group,
    pub prices: [Decimal; 8],
    pub bar_indices: [usize; 8],
    pub volumes: [Decimal; 8],
    /// p2 of the pattern, derived rather than independently tracked —
    /// see DESIGN.md for why this is read straight off `prices[1]`.
    pub p2_ref: Decimal,
    pub p5_ref: Decimal,
    pub p6_ref: Decimal,
    pub last_bar_idx: usize,
    /// Open time of the P8 candle, the anchor `TimeframeState` records when
    /// this pattern fires and locks, compared across scans instead of the
    /// window-relative `last_bar_idx`.
    pub last_bar_open_time: i64,
}

impl EightPivotPattern {
    pub fn p(&self, n: usize) -> Decimal {
        self.prices[n - 1]
    }

    pub fn v(&self, n: usize) -> Decimal {
        self.volumes[n - 1]
    }

    pub fn bar(&self, n: usize) -> usize {
        self.bar_indices[n - 1]
    }
}
