use serde::{Deserialize, Serialize};

/// A closed span `[start, end]` of confirmed playback, in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Zero-or-more width span beginning at `at`.
    pub fn at(at: f64, width: f64) -> Self {
        Self {
            start: at,
            end: at + width,
        }
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns a copy usable by the merge sweep, or `None` for garbage.
    ///
    /// Non-finite bounds and spans whose end precedes their start are dropped;
    /// negative bounds are pulled up to zero.
    pub fn normalized(&self) -> Option<Self> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return None;
        }
        if self.end < self.start {
            return None;
        }
        Some(Self {
            start: self.start.max(0.0),
            end: self.end.max(0.0),
        })
    }

    /// Clamps both bounds into `[0, limit]`. A non-positive limit means the
    /// upper bound is unknown and only the lower clamp applies.
    pub fn clamped_to(&self, limit: f64) -> Self {
        let upper = if limit > 0.0 { limit } else { f64::INFINITY };
        Self {
            start: self.start.clamp(0.0, upper),
            end: self.end.clamp(0.0, upper),
        }
    }
}
