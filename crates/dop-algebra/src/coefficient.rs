//! Base rings an Ore algebra can be built over.

use std::fmt::{self, Debug};
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Zero};

use crate::{Poly, Rational, RationalFunction};

/// A commutative differential ring in one variable over Q.
///
/// # Laws
///
/// - `derivative` is additive and satisfies the Leibniz rule
/// - `derivative(variable()) == one()`
pub trait Coefficient:
    Clone
    + PartialEq
    + Debug
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self, Output = Self>
{
    /// The generator of the ring.
    fn variable() -> Self;

    fn from_rational(c: Rational) -> Self;

    /// The value as a rational constant, if it is one.
    fn as_constant(&self) -> Option<Rational>;

    fn derivative(&self) -> Self;

    /// Multiplicative inverse within the ring, if it exists.
    fn inverse(&self) -> Option<Self>;

    /// `self / divisor` when the quotient lies in the ring.
    fn exact_div(&self, divisor: &Self) -> Option<Self>;

    /// Whether the rendered form is a single factor that can be followed by
    /// `*D` without parentheses.
    fn is_single_term(&self) -> bool;

    fn write_with(&self, var: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl Coefficient for Poly {
    fn variable() -> Self {
        Poly::x()
    }

    fn from_rational(c: Rational) -> Self {
        Poly::constant(c)
    }

    fn as_constant(&self) -> Option<Rational> {
        Poly::as_constant(self)
    }

    fn derivative(&self) -> Self {
        Poly::derivative(self)
    }

    fn inverse(&self) -> Option<Self> {
        self.as_constant()
            .and_then(|c| c.recip())
            .map(Poly::constant)
    }

    fn exact_div(&self, divisor: &Self) -> Option<Self> {
        Poly::exact_div(self, divisor)
    }

    fn is_single_term(&self) -> bool {
        self.term_count() <= 1
    }

    fn write_with(&self, var: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display(var))
    }
}

impl Coefficient for RationalFunction {
    fn variable() -> Self {
        RationalFunction::from_poly(Poly::x())
    }

    fn from_rational(c: Rational) -> Self {
        RationalFunction::from_poly(Poly::constant(c))
    }

    fn as_constant(&self) -> Option<Rational> {
        RationalFunction::as_constant(self)
    }

    fn derivative(&self) -> Self {
        RationalFunction::derivative(self)
    }

    fn inverse(&self) -> Option<Self> {
        RationalFunction::inverse(self)
    }

    fn exact_div(&self, divisor: &Self) -> Option<Self> {
        divisor.inverse().map(|inv| self * &inv)
    }

    fn is_single_term(&self) -> bool {
        self.is_polynomial() && self.numerator().term_count() <= 1
    }

    fn write_with(&self, var: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display(var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_differentiates_to_one() {
        assert!(<Poly as Coefficient>::variable().derivative().is_one());
        assert!(<RationalFunction as Coefficient>::variable()
            .derivative()
            .is_one());
    }

    #[test]
    fn polynomial_inverse_is_limited_to_constants() {
        let two = Poly::from_rational(Rational::from(2));
        assert_eq!(
            Coefficient::inverse(&two),
            Some(Poly::constant(Rational::from_i64(1, 2)))
        );
        assert_eq!(Coefficient::inverse(&Poly::x()), None);
        assert_eq!(Coefficient::inverse(&Poly::zero()), None);

        let t = <RationalFunction as Coefficient>::variable();
        assert!(Coefficient::inverse(&t).is_some());
    }
}
