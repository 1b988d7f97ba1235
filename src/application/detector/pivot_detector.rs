//! Pivot Detector.
//!
//! Reconstructs the ordered pivot history from scratch over a window of
//! closed candles: identifies pivot highs/lows, classifies each into one
//! of six strict variants, discards variants excluded by the configured
//! allow-set, and inserts a synthetic opposite-kind pivot whenever two
//! same-kind pivots land back to back with a short enough gap between
//! them, to preserve strict alternation.

use crate::domain::market::candle::Candle;
use crate::domain::market::pivot::{Pivot, PivotKind, PivotVariant, VariantFilter};

pub struct PivotDetector {
    left: usize,
    right: usize,
    use_variant_filter: bool,
    filter: VariantFilter,
}

impl PivotDetector {
    pub fn new(left: usize, right: usize, use_variant_filter: bool, filter: VariantFilter) -> Self {
        Self {
            left,
            right,
            use_variant_filter,
            filter,
        }
    }

    /// Run detection over `candles` (oldest first) and return the fully
    /// processed pivot history, including inserted synthetic pivots,
    /// bar-index ordered.
    pub fn detect(&self, candles: &[Candle]) -> Vec<Pivot> {
        let mut stored: Vec<Pivot> = Vec::new();
        let n = candles.len();
        if self.left == 0 || self.right == 0 || n <= self.left + self.right {
            return stored;
        }

        for i in self.left..(n - self.right) {
            // Classification always looks at the immediate neighbors of the
            // candidate bar, independent of the left/right window used to
            // identify it as a pivot in the first place.
            if i == 0 || i + 1 >= n {
                continue;
            }

            if self.is_pivot_high(candles, i) {
                if let Some(pivot) = self.classify(candles, i, PivotKind::High) {
                    self.accept(&mut stored, candles, pivot);
                }
            }
            if self.is_pivot_low(candles, i) {
                if let Some(pivot) = self.classify(candles, i, PivotKind::Low) {
                    self.accept(&mut stored, candles, pivot);
                }
            }
        }

        stored
    }

    fn is_pivot_high(&self, candles: &[Candle], i: usize) -> bool {
        let high = candles[i].high;
        ((i - self.left)..i).all(|j| high > candles[j].high)
            && ((i + 1)..=(i + self.right)).all(|j| high > candles[j].high)
    }

    fn is_pivot_low(&self, candles: &[Candle], i: usize) -> bool {
        let low = candles[i].low;
        ((i - self.left)..i).all(|j| low < candles[j].low)
            && ((i + 1)..=(i + self.right)).all(|j| low < candles[j].low)
    }

    fn classify(&self, candles: &[Candle], i: usize, kind: PivotKind) -> Option<Pivot> {
        let h1 = candles[i - 1].high;
        let l1 = candles[i - 1].low;
        let h2 = candles[i].high;
        let l2 = candles[i].low;
        let h3 = candles[i + 1].high;
        let l3 = candles[i + 1].low;

        let variant = match kind {
            PivotKind::High => {
                if h2 > h1 && h2 > h3 && l2 > l1 && l2 > l3 {
                    PivotVariant::Ph1
                } else if h2 >= h1 && h2 > h3 && l2 > l3 && l2 < l1 {
                    PivotVariant::Ph2
                } else if h2 > h1 && h2 >= h3 && l2 < l3 && l2 > l1 {
                    PivotVariant::Ph3
                } else {
                    return None;
                }
            }
            PivotKind::Low => {
                if l2 < l1 && l2 < l3 && h2 < h1 && h2 < h3 {
                    PivotVariant::Pl1
                } else if h2 >= h1 && h2 < h3 && l2 < l3 && l2 <= l1 {
                    PivotVariant::Pl2
                } else if l2 < l1 && l2 < l3 && h2 < h1 && h2 > h3 {
                    PivotVariant::Pl3
                } else {
                    return None;
                }
            }
        };

        if self.use_variant_filter && !self.filter.allows(variant) {
            return None;
        }

        let price = match kind {
            PivotKind::High => h2,
            PivotKind::Low => l2,
        };
        Some(Pivot::new(i, price, kind, variant))
    }

    /// Append `pivot`, inserting a synthetic opposite-kind pivot first if it
    /// follows a same-kind pivot with a gap of 1-3 bars between them.
    fn accept(&self, stored: &mut Vec<Pivot>, candles: &[Candle], pivot: Pivot) {
        if let Some(prev) = stored.last().copied() {
            if prev.kind == pivot.kind {
                let gap_start = prev.bar_index + 1;
                let gap_end = pivot.bar_index; // exclusive
                let gap_len = gap_end.saturating_sub(gap_start);
                if gap_len >= 1 && gap_len <= 3 {
                    if let Some(synthetic) =
                        Self::find_opposite_extreme(candles, gap_start, gap_end, pivot.kind)
                    {
                        stored.push(synthetic);
                    }
                }
            }
        }
        stored.push(pivot);
    }

    fn find_opposite_extreme(
        candles: &[Candle],
        gap_start: usize,
        gap_end: usize,
        kind: PivotKind,
    ) -> Option<Pivot> {
        match kind {
            // Two HIGHs in a row: synthetic LOW at the gap's minimum low.
            PivotKind::High => {
                let mut best: Option<(usize, rust_decimal::Decimal)> = None;
                for j in gap_start..gap_end {
                    let low = candles[j].low;
                    if best.is_none_or(|(_, best_low)| low < best_low) {
                        best = Some((j, low));
                    }
                }
                best.map(|(idx, low)| Pivot::new(idx, low, PivotKind::Low, PivotVariant::Synthetic))
            }
            // Two LOWs in a row: synthetic HIGH at the gap's maximum high.
            PivotKind::Low => {
                let mut best: Option<(usize, rust_decimal::Decimal)> = None;
                for j in gap_start..gap_end {
                    let high = candles[j].high;
                    if best.is_none_or(|(_, best_high)| high > best_high) {
                        best = Some((j, high));
                    }
                }
                best.map(|(idx, high)| Pivot::new(idx, high, PivotKind::High, PivotVariant::Synthetic))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn c(o: i64, h: i64, l: i64, cl: i64, v: i64) -> Candle {
        Candle::new(
            "BTCUSDT",
            0,
            Decimal::from(o),
            Decimal::from(h),
            Decimal::from(l),
            Decimal::from(cl),
            Decimal::from(v),
        )
        .unwrap()
    }

    fn detector() -> PivotDetector {
        PivotDetector::new(1, 1, false, VariantFilter::default())
    }

    #[test]
    fn consecutive_stored_pivots_differ_in_kind() {
        // A simple zig-zag with no long same-kind gaps.
        let candles = vec![
            c(10, 10, 9, 10, 1),
            c(10, 15, 10, 11, 1), // pivot high candidate
            c(9, 11, 8, 9, 1),
            c(8, 9, 5, 6, 1), // pivot low candidate
            c(7, 10, 6, 9, 1),
            c(9, 16, 8, 10, 1), // pivot high candidate
            c(9, 10, 7, 8, 1),
        ];
        let pivots = detector().detect(&candles);
        for w in pivots.windows(2) {
            assert_ne!(w[0].kind, w[1].kind);
        }
    }

    #[test]
    fn gap_of_zero_inserts_no_synthetic() {
        // Two adjacent pivot highs (bar i, bar i+1... but detection requires
        // isolation) is hard to construct directly; instead verify via the
        // insertion helper that a zero gap yields no synthetic.
        let candles = vec![c(1, 2, 1, 1, 1)];
        assert!(PivotDetector::find_opposite_extreme(&candles, 0, 0, PivotKind::High).is_none());
    }

    #[test]
    fn gap_in_one_to_three_inserts_exactly_one_synthetic() {
        let candles = vec![
            c(10, 10, 9, 10, 1), // gap_start
            c(9, 9, 5, 7, 1),    // minimum low here
            c(8, 9, 6, 8, 1),
        ];
        let synthetic = PivotDetector::find_opposite_extreme(&candles, 0, 3, PivotKind::High).unwrap();
        assert_eq!(synthetic.kind, PivotKind::Low);
        assert_eq!(synthetic.price, Decimal::from(5));
        assert_eq!(synthetic.bar_index, 1);
    }

    #[test]
    fn gap_over_three_inserts_nothing() {
        let candles = vec![c(1, 2, 1, 1, 1); 5];
        assert!(PivotDetector::find_opposite_extreme(&candles, 0, 5, PivotKind::High).is_some());
        // gap_len > 3 is checked by `accept`, not `find_opposite_extreme`
        // itself; verify the caller's guard directly via `accept`.
        let mut stored = vec![Pivot::new(0, Decimal::from(1), PivotKind::High, PivotVariant::Ph1)];
        let far = Pivot::new(10, Decimal::from(2), PivotKind::High, PivotVariant::Ph1);
        let long_candles = vec![c(1, 1, 1, 1, 1); 11];
        detector().accept(&mut stored, &long_candles, far);
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn variant_filter_discards_disallowed_variants() {
        let mut filter = VariantFilter::default();
        filter.allow_ph1 = false;
        let det = PivotDetector::new(1, 1, true, filter);
        // A PH1-classified bar: h2>h1, h2>h3, l2>l1, l2>l3.
        let candles = vec![
            c(5, 10, 5, 8, 1),
            c(6, 15, 9, 10, 1),
            c(5, 11, 6, 9, 1),
        ];
        assert!(det.classify(&candles, 1, PivotKind::High).is_none());
    }
}
