//! Pivot points: the atoms the Eight-Pivot Validator operates on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotKind {
    High,
    Low,
}

impl PivotKind {
    pub fn opposite(self) -> Self {
        match self {
            PivotKind::High => PivotKind::Low,
            PivotKind::Low => PivotKind::High,
        }
    }
}

/// One of the six strict pivot classifications, or a synthetic pivot
/// inserted to preserve alternation between two same-kind pivots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotVariant {
    Ph1,
    Ph2,
    Ph3,
    Pl1,
    Pl2,
    Pl3,
    Synthetic,
}

/// A pivot bound to a bar index within the current detection window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub bar_index: usize,
    pub price: Decimal,
    pub kind: PivotKind,
    pub variant: PivotVariant,
}

impl Pivot {
    pub fn new(bar_index: usize, price: Decimal, kind: PivotKind, variant: PivotVariant) -> Self {
        Self {
            bar_index,
            price,
            kind,
            variant,
        }
    }
}

/// Which of the six non-synthetic variants are accepted, via a configurable
/// allow-set (`allow_ph1..ph3, allow_pl1..pl3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantFilter {
    pub allow_ph1: bool,
    pub allow_ph2: bool,
    pub allow_ph3: bool,
    pub allow_pl1: bool,
    pub allow_pl2: bool,
    pub allow_pl3: bool,
}

impl Default for VariantFilter {
    fn default() -> Self {
        Self {
            allow_ph1: true,
            allow_ph2: true,
            allow_ph3: true,
            allow_pl1: true,
            allow_pl2: true,
            allow_pl3: true,
        }
    }
}

impl VariantFilter {
    pub fn allows(&self, variant: PivotVariant) -> bool {
        match variant {
            PivotVariant::Ph1 => self.allow_ph1,
            PivotVariant::Ph2 => self.allow_ph2,
            PivotVariant::Ph3 => self.allow_ph3,
            PivotVariant::Pl1 => self.allow_pl1,
            PivotVariant::Pl2 => self.allow_pl2,
            PivotVariant::Pl3 => self.allow_pl3,
            // Synthetic pivots are inserted by the detector itself, never filtered.
            PivotVariant::Synthetic => true,
        }
    }
}
