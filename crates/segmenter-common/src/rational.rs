//! Rational numbers in the shape FFmpeg uses for time bases.

use std::cmp::Ordering;
use std::fmt;

/// A time base or rate expressed as `num / den`.
///
/// Equality is structural (`1/2 != 2/4`); use [`Rational::cmp_value`] to
/// compare the values the fractions denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    /// Create a new rational. The sign is moved onto the numerator.
    pub const fn new(num: i32, den: i32) -> Self {
        if den < 0 && num != i32::MIN && den != i32::MIN {
            Self {
                num: -num,
                den: -den,
            }
        } else {
            Self { num, den }
        }
    }

    /// One millisecond, the cut-over used when picking an effective time base.
    pub const MILLISECOND: Rational = Rational::new(1, 1000);

    /// A usable time base has a positive numerator and denominator.
    pub fn is_valid(&self) -> bool {
        self.num > 0 && self.den > 0
    }

    /// Multiply the numerator by `factor`, returning `None` on overflow.
    pub fn checked_mul_int(self, factor: i32) -> Option<Rational> {
        self.num
            .checked_mul(factor)
            .map(|num| Rational::new(num, self.den))
    }

    /// Reduce to lowest terms.
    pub fn reduced(self) -> Rational {
        let divisor = gcd(self.num.unsigned_abs(), self.den.unsigned_abs());
        if divisor <= 1 {
            return self;
        }
        // divisor divides both values, so the quotients fit back into i32
        Rational::new(
            (i64::from(self.num) / i64::from(divisor)) as i32,
            (i64::from(self.den) / i64::from(divisor)) as i32,
        )
    }

    /// Compare the values of two rationals exactly.
    ///
    /// Both denominators must be positive, which holds for every valid time base.
    pub fn cmp_value(&self, other: &Rational) -> Ordering {
        let lhs = i64::from(self.num) * i64::from(other.den);
        let rhs = i64::from(other.num) * i64::from(self.den);
        lhs.cmp(&rhs)
    }

    /// Convert to a floating-point value. Returns 0.0 for a zero denominator.
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            f64::from(self.num) / f64::from(self.den)
        }
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Rational::new(num, den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
