//! Exact stream timestamps.
//!
//! A [`StreamTime`] keeps the tick count together with the time base it was
//! measured in. Comparisons and differences cross-multiply in 128-bit
//! integers, so timestamps from tracks with unrelated time bases can be
//! compared without rounding. Conversion to seconds as `f64` only happens
//! when a duration leaves the engine.

use crate::Rational;
use std::cmp::Ordering;
use std::fmt;

/// Microsecond time base used for container-level durations.
const MICROSECOND: Rational = Rational::new(1, 1_000_000);

/// A timestamp expressed as `ticks × time_base` seconds.
#[derive(Debug, Clone, Copy)]
pub struct StreamTime {
    ticks: i64,
    time_base: Rational,
}

impl StreamTime {
    /// The start of the stream.
    pub const ZERO: StreamTime = StreamTime {
        ticks: 0,
        time_base: Rational::new(1, 1),
    };

    /// Create a timestamp. An unusable time base (zero or negative
    /// denominator) is replaced by `1/1` with zero ticks.
    pub fn new(ticks: i64, time_base: Rational) -> Self {
        let time_base = Rational::new(time_base.num, time_base.den);
        if time_base.den <= 0 {
            return Self::ZERO;
        }
        Self { ticks, time_base }
    }

    /// Create a timestamp from microseconds (FFmpeg's `AV_TIME_BASE` units).
    pub fn from_micros(micros: i64) -> Self {
        Self::new(micros, MICROSECOND)
    }

    /// Tick count in [`StreamTime::time_base`] units.
    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Time base the ticks are measured in.
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// This timestamp in seconds.
    pub fn as_secs_f64(&self) -> f64 {
        let (num, den) = self.scaled();
        num as f64 / den as f64
    }

    /// Seconds elapsed from `earlier` to `self`, computed exactly and
    /// converted to `f64` at the end. Negative when `earlier` is later.
    pub fn seconds_since(&self, earlier: StreamTime) -> f64 {
        let (a_num, a_den) = self.scaled();
        let (b_num, b_den) = earlier.scaled();
        let num = a_num * b_den - b_num * a_den;
        let den = a_den * b_den;
        // Shrink before converting so large tick counts keep their precision.
        let divisor = gcd_i128(num.abs(), den);
        if divisor > 1 {
            (num / divisor) as f64 / (den / divisor) as f64
        } else {
            num as f64 / den as f64
        }
    }

    /// `ticks × num` over `den`, with `den > 0`.
    fn scaled(&self) -> (i128, i128) {
        (
            i128::from(self.ticks) * i128::from(self.time_base.num),
            i128::from(self.time_base.den),
        )
    }
}

impl Default for StreamTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for StreamTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StreamTime {}

impl PartialOrd for StreamTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StreamTime {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a_num, a_den) = self.scaled();
        let (b_num, b_den) = other.scaled();
        (a_num * b_den).cmp(&(b_num * a_den))
    }
}

impl fmt::Display for StreamTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.as_secs_f64())
    }
}

fn gcd_i128(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
