//! Per-(symbol, timeframe) mutable state.
//!
//! Owned exclusively by the orchestrator worker for that key: no shared
//! global singletons, no cross-key mutation. The pivot history
//! is rebuilt from scratch on every scan; `last_pattern`, `choch_locked`,
//! and the locked pattern's anchor open time are the only state that must
//! survive from the validator/confirmer step of one scan into the next.

use crate::domain::market::pattern::EightPivotPattern;
use crate::domain::market::pivot::Pivot;
use std::collections::VecDeque;

pub const DEFAULT_PIVOT_CAP: usize = 200;

#[derive(Debug, Clone)]
pub struct TimeframeState {
    pivots: VecDeque<Pivot>,
    cap: usize,
    pub last_pattern: Option<EightPivotPattern>,
    pub choch_locked: bool,
    /// Open time of the P8 candle belonging to whichever pattern is
    /// currently locked (the one that actually fired), independent of
    /// `last_pattern`, which tracks the most recently *validated* pattern
    /// and gets overwritten every scan regardless of lock state.
    locked_anchor_open_time: Option<i64>,
}

impl TimeframeState {
    pub fn new(cap: usize) -> Self {
        Self {
            pivots: VecDeque::with_capacity(cap.min(64)),
            cap,
            last_pattern: None,
            choch_locked: false,
            locked_anchor_open_time: None,
        }
    }

    /// Full reset of the pivot history. Called at the start of every scan —
    /// candle windows are rebuilt from fresh closed candles each time, so
    /// pivot history itself does not persist across scans, only the derived
    /// `last_pattern`/`choch_locked` do.
    pub fn rebuild_pivots(&mut self) {
        self.pivots.clear();
    }

    pub fn push_pivot(&mut self, pivot: Pivot) {
        if self.pivots.len() == self.cap {
            self.pivots.pop_front();
        }
        self.pivots.push_back(pivot);
    }

    pub fn pivots(&self) -> &VecDeque<Pivot> {
        &self.pivots
    }

    pub fn last_eight(&self) -> Option<[Pivot; 8]> {
        if self.pivots.len() < 8 {
            return None;
        }
        let skip = self.pivots.len() - 8;
        let mut out = [Pivot::new(
            0,
            rust_decimal::Decimal::ZERO,
            crate::domain::market::pivot::PivotKind::High,
            crate::domain::market::pivot::PivotVariant::Synthetic,
        ); 8];
        for (slot, pivot) in out.iter_mut().zip(self.pivots.iter().skip(skip)) {
            *slot = *pivot;
        }
        Some(out)
    }

    /// Record that a pattern fired and locked, anchored to the open time of
    /// its P8 candle. `choch_locked` and the anchor move together; only
    /// `maybe_unlock` clears either.
    pub fn lock(&mut self, anchor_open_time: i64) {
        self.choch_locked = true;
        self.locked_anchor_open_time = Some(anchor_open_time);
    }

    /// If `newest_pivot_open_time` is strictly newer than the anchor of the
    /// pattern currently locked, clear the lock so the next pattern can fire
    /// a new signal. Evaluated against the anchor recorded at lock time, not
    /// against whatever pattern this scan just validated (`last_pattern`):
    /// since pivot bar indices are window-relative and the pivot history is
    /// rebuilt from scratch every scan, comparing against `last_pattern`'s
    /// own last bar is always a comparison against itself.
    pub fn maybe_unlock(&mut self, newest_pivot_open_time: i64) {
        if !self.choch_locked {
            return;
        }
        if let Some(anchor) = self.locked_anchor_open_time {
            if newest_pivot_open_time > anchor {
                self.choch_locked = false;
                self.locked_anchor_open_time = None;
            }
        }
    }
}
