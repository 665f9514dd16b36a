//! Arbitrary precision rational numbers.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use dashu::base::{Inverse, Signed as DashuSigned, UnsignedAbs};
use dashu::integer::IBig;
use dashu::rational::RBig;
use num_traits::{One, Zero};

/// An exact rational number, always stored in lowest terms with a positive
/// denominator.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rational(RBig);

impl Rational {
    /// Builds `numerator / denominator`, or `None` when the denominator is zero.
    #[must_use]
    pub fn new(numerator: IBig, denominator: IBig) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        let negative = DashuSigned::is_negative(&denominator);
        let value = RBig::from_parts(numerator, denominator.unsigned_abs());
        Some(Self(if negative { -value } else { value }))
    }

    #[must_use]
    pub fn from_integer(n: IBig) -> Self {
        Self(RBig::from(n))
    }

    /// Creates a rational from i64 numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    #[must_use]
    pub fn from_i64(numerator: i64, denominator: i64) -> Self {
        assert!(denominator != 0, "denominator cannot be zero");
        Self::new(IBig::from(numerator), IBig::from(denominator)).unwrap_or_default()
    }

    /// Parses a run of ASCII decimal digits, optionally signed.
    #[must_use]
    pub fn parse_integer(digits: &str) -> Option<Self> {
        IBig::from_str_radix(digits, 10)
            .ok()
            .map(Self::from_integer)
    }

    #[must_use]
    pub fn numerator(&self) -> IBig {
        self.0.numerator().clone()
    }

    #[must_use]
    pub fn denominator(&self) -> IBig {
        IBig::from(self.0.denominator().clone())
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.0.denominator().is_one()
    }

    /// Converts to an `i64` when the value is an integer that fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.numerator().try_into().ok()
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self.clone()
        }
    }

    /// Returns the reciprocal, or `None` for zero.
    #[must_use]
    pub fn recip(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(Self(self.0.clone().inv()))
        }
    }

    #[must_use]
    pub fn pow(&self, exp: u32) -> Self {
        Self(self.0.pow(exp as usize))
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        Self(RBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Rational {
    fn one() -> Self {
        Self(RBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == RBig::ONE
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({self})")
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator())
        } else {
            write!(f, "{}/{}", self.numerator(), self.denominator())
        }
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, rhs: Self) -> Self::Output {
        Rational(&self.0 + &rhs.0)
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, rhs: Self) -> Self::Output {
        Rational(&self.0 - &rhs.0)
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, rhs: Self) -> Self::Output {
        Rational(&self.0 * &rhs.0)
    }
}

impl Div for &Rational {
    type Output = Rational;

    fn div(self, rhs: Self) -> Self::Output {
        Rational(&self.0 / &rhs.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        Rational(-&self.0)
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        Rational(-self.0)
    }
}

forward_binop!(Rational, Add, add);
forward_binop!(Rational, Sub, sub);
forward_binop!(Rational, Mul, mul);
forward_binop!(Rational, Div, div);

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_integer(IBig::from(n))
    }
}

impl From<IBig> for Rational {
    fn from(n: IBig) -> Self {
        Self::from_integer(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let a = Rational::from_i64(1, 2);
        let b = Rational::from_i64(1, 3);

        assert_eq!(&a + &b, Rational::from_i64(5, 6));
        assert_eq!(&a * &b, Rational::from_i64(1, 6));
        assert_eq!(&a / &b, Rational::from_i64(3, 2));
    }

    #[test]
    fn test_reduction_and_sign() {
        assert_eq!(Rational::from_i64(4, 6), Rational::from_i64(2, 3));
        assert_eq!(Rational::from_i64(1, -2), Rational::from_i64(-1, 2));
        assert!(Rational::new(IBig::from(1), IBig::from(0)).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rational::from_i64(3, 1).to_string(), "3");
        assert_eq!(Rational::from_i64(-2, 3).to_string(), "-2/3");
    }

    #[test]
    fn parses_large_integers() {
        let big = Rational::parse_integer("123456789012345678901234567890").unwrap();
        assert!(big.is_integer());
        assert_eq!(big.to_i64(), None);
        assert_eq!(Rational::parse_integer("42").unwrap().to_i64(), Some(42));
        assert!(Rational::parse_integer("4x").is_none());
    }

    #[test]
    fn recip_of_zero_is_none() {
        assert!(Rational::zero().recip().is_none());
        assert_eq!(
            Rational::from_i64(-3, 4).recip(),
            Some(Rational::from_i64(-4, 3))
        );
    }
}
