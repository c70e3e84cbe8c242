//! Tolerance band below pure white.

use std::fmt;

/// How far below 255 a channel may fall and still count as white.
///
/// Any `i32` is accepted. The band is open at the bottom: a channel matches
/// when it is strictly greater than [`threshold()`](Tolerance::threshold).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tolerance(i32);

impl Tolerance {
    /// Tolerance used when the caller does not pick one.
    pub const DEFAULT: Tolerance = Tolerance(10);

    #[inline]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Build from a wider integer, clamping to the `i32` range.
    ///
    /// Every value outside `i32` already lands in a degenerate band (nothing
    /// or everything matches), so clamping does not change the outcome.
    #[inline]
    pub fn saturating(value: i64) -> Self {
        Self(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }

    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// `255 - tolerance`, saturating at the `i32` bounds.
    #[inline]
    pub const fn threshold(self) -> i32 {
        255i32.saturating_sub(self.0)
    }

    /// Whether a single channel value lies inside the band.
    #[inline]
    pub fn admits(self, channel: u8) -> bool {
        i32::from(channel) > self.threshold()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i32> for Tolerance {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<i64> for Tolerance {
    fn from(value: i64) -> Self {
        Self::saturating(value)
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
