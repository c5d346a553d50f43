//! Incremental library complexity tracking.
//!
//! Library complexity is summarised by the number of distinct (strand-aware)
//! positions observed for uniquely mapping reads and how often each of them
//! was hit. Rather than building the full histogram of hits per position, the
//! tracker keeps five running counters which are updated in constant time as
//! each observation moves a position from one multiplicity to the next:
//!
//! | new count | `U_P` | `U_R` | `M0` | `M1` | `M2` |
//! |-----------|-------|-------|------|------|------|
//! | 1         | +1    | +1    | +1   | +1   |      |
//! | 2         |       | +1    |      | -1   | +1   |
//! | 3         |       | +1    |      |      | -1   |
//! | > 3       |       | +1    |      |      |      |
//!
//! From these, `PBC1 = M1 / M0`, `PBC2 = M1 / M2` and `NRF = U_P / U_R`.

use std::collections::HashMap;
use std::ops::AddAssign;

use serde::Serialize;

use crate::stats::classify::PositionKey;

/// The running library complexity counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComplexitySummary {
    /// Distinct positions observed (incremented on a position's first hit).
    pub u_p: u64,

    /// Uniquely mapping reads or pairs observed.
    pub u_r: u64,

    /// Distinct positions observed at least once.
    pub m0: u64,

    /// Positions currently observed exactly once.
    pub m1: u64,

    /// Positions currently observed exactly twice.
    pub m2: u64,
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    match denominator {
        0 => None,
        _ => Some(numerator as f64 / denominator as f64),
    }
}

impl ComplexitySummary {
    /// PCR bottlenecking coefficient 1 (`M1 / M0`), if defined.
    pub fn pbc1(&self) -> Option<f64> {
        ratio(self.m1, self.m0)
    }

    /// PCR bottlenecking coefficient 2 (`M1 / M2`), if defined.
    pub fn pbc2(&self) -> Option<f64> {
        ratio(self.m1, self.m2)
    }

    /// Non-redundant fraction (`U_P / U_R`), if defined.
    pub fn nrf(&self) -> Option<f64> {
        ratio(self.u_p, self.u_r)
    }
}

/// Tracks observations per position and keeps a [`ComplexitySummary`] in
/// step with them.
#[derive(Clone, Debug, Default)]
pub struct ComplexityTracker {
    observations: HashMap<PositionKey, u64>,
    summary: ComplexitySummary,
}

impl ComplexityTracker {
    /// Creates a new, empty [`ComplexityTracker`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one uniquely mapping read (or pair) at `key` and returns the
    /// number of times the position has now been observed.
    pub fn observe(&mut self, key: PositionKey) -> u64 {
        let count = self.observations.entry(key).or_insert(0);
        *count += 1;

        let summary = &mut self.summary;
        summary.u_r += 1;

        match *count {
            1 => {
                summary.u_p += 1;
                summary.m0 += 1;
                summary.m1 += 1;
            }
            2 => {
                summary.m1 -= 1;
                summary.m2 += 1;
            }
            3 => summary.m2 -= 1,
            _ => {}
        }

        *count
    }

    /// The current counters.
    pub fn summary(&self) -> ComplexitySummary {
        self.summary
    }

    /// Folds the observations of another tracker into this one. The result is
    /// the same as if every observation had been made on a single tracker, in
    /// any order.
    pub fn merge(&mut self, other: ComplexityTracker) {
        for (key, count) in other.observations {
            *self.observations.entry(key).or_insert(0) += count;
        }

        self.summary = summarize(&self.observations);
    }
}

impl AddAssign for ComplexityTracker {
    fn add_assign(&mut self, other: Self) {
        self.merge(other);
    }
}

/// Computes the counters directly from the per-position observation counts.
fn summarize(observations: &HashMap<PositionKey, u64>) -> ComplexitySummary {
    let mut summary = ComplexitySummary::default();

    for count in observations.values().copied().filter(|c| *c > 0) {
        summary.u_p += 1;
        summary.m0 += 1;
        summary.u_r += count;

        match count {
            1 => summary.m1 += 1,
            2 => summary.m2 += 1,
            _ => {}
        }
    }

    summary
}
