//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically non-decreasing `Ticks` counter.
//! Event times and block end times are absolute tick values; durations
//! (run, setup, clean) are plain `u64` tick counts.  Using an integer tick
//! as the canonical time unit means all sequencing arithmetic is exact (no
//! floating-point drift) and comparisons are O(1).  The mapping from ticks
//! to wall-clock time is the caller's concern.

use std::fmt;

/// An absolute simulation time point.
///
/// Stored as `u64` to avoid overflow: at 1 tick/second a u64 lasts ~585
/// billion years, far longer than any schedule horizon.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    /// Return the time point `n` ticks after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Ticks {
        Ticks(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Ticks) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Ticks {
    type Output = Ticks;
    #[inline]
    fn add(self, rhs: u64) -> Ticks {
        Ticks(self.0 + rhs)
    }
}

impl std::ops::Sub for Ticks {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Ticks) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
