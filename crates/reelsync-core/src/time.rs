//! Time representation for playback synchronization
//!
//! Media elements report positions as float seconds, and every boundary or
//! drift decision in the engine is tolerance-based, so time is a thin f64
//! newtype with explicit epsilon comparisons rather than exact arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A time value in seconds.
///
/// May be transiently negative as the result of subtraction; call sites that
/// require a non-negative value clamp with [`Seconds::max_zero`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seconds(f64);

impl Seconds {
    /// Zero time constant.
    pub const ZERO: Self = Self(0.0);

    /// Create a time value from seconds.
    #[inline]
    pub fn new(seconds: f64) -> Self {
        Self(seconds)
    }

    /// Create a time value from whole milliseconds.
    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        Self(millis as f64 / 1000.0)
    }

    /// Raw value in seconds.
    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Check if this time is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// Absolute difference between two times.
    #[inline]
    pub fn abs_diff(self, other: Self) -> Self {
        Self((self.0 - other.0).abs())
    }

    /// True when the two values differ by no more than `epsilon`.
    #[inline]
    pub fn approx_eq(self, other: Self, epsilon: Self) -> bool {
        (self.0 - other.0).abs() <= epsilon.0
    }

    /// True when this time has reached `boundary`, allowing the reported
    /// value to fall short by up to `epsilon` (time reports are coarse and
    /// can skip past the exact boundary frame).
    #[inline]
    pub fn at_or_after(self, boundary: Self, epsilon: Self) -> bool {
        self.0 >= boundary.0 - epsilon.0
    }

    /// Clamp into `[lo, hi]`.
    #[inline]
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        Self(self.0.clamp(lo.0, hi.0))
    }

    /// Clamp negative values to zero.
    #[inline]
    pub fn max_zero(self) -> Self {
        if self.0 < 0.0 {
            Self::ZERO
        } else {
            self
        }
    }
}

impl Default for Seconds {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Seconds {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Seconds {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Seconds {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}
