//! Rational functions over Q.
//!
//! A rational function is a quotient `P(t)/Q(t)` kept in canonical form:
//! - the denominator is monic
//! - numerator and denominator are coprime
//! - zero is represented as `0/1`

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Zero};

use crate::{Poly, Rational};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct RationalFunction {
    numerator: Poly,
    denominator: Poly,
}

impl RationalFunction {
    /// Builds the canonical form of `numerator / denominator`, or `None` when
    /// the denominator is zero.
    #[must_use]
    pub fn new(numerator: Poly, denominator: Poly) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        if numerator.is_zero() {
            return Some(Self::zero());
        }

        let g = numerator.gcd(&denominator);
        let (mut num, mut den) = match (numerator.exact_div(&g), denominator.exact_div(&g)) {
            (Some(num), Some(den)) => (num, den),
            _ => (numerator, denominator),
        };
        if let Some(inv) = den.leading_coeff().and_then(Rational::recip) {
            num = num.scale(&inv);
            den = den.scale(&inv);
        }
        Some(Self {
            numerator: num,
            denominator: den,
        })
    }

    #[must_use]
    pub fn from_poly(p: Poly) -> Self {
        Self {
            numerator: p,
            denominator: Poly::one(),
        }
    }

    #[must_use]
    pub fn numerator(&self) -> &Poly {
        &self.numerator
    }

    #[must_use]
    pub fn denominator(&self) -> &Poly {
        &self.denominator
    }

    #[must_use]
    pub fn is_polynomial(&self) -> bool {
        self.denominator.is_one()
    }

    #[must_use]
    pub fn as_constant(&self) -> Option<Rational> {
        if self.is_polynomial() {
            self.numerator.as_constant()
        } else {
            None
        }
    }

    /// Multiplicative inverse, `None` for zero.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    /// `(n/d)' = (n'd - nd') / d^2`
    #[must_use]
    pub fn derivative(&self) -> Self {
        let num = &(&self.numerator.derivative() * &self.denominator)
            - &(&self.numerator * &self.denominator.derivative());
        let den = &self.denominator * &self.denominator;
        Self::new(num, den).unwrap_or_else(Self::zero)
    }

    #[must_use]
    pub fn display<'a>(&'a self, var: &'a str) -> RationalFunctionDisplay<'a> {
        RationalFunctionDisplay { value: self, var }
    }
}

pub struct RationalFunctionDisplay<'a> {
    value: &'a RationalFunction,
    var: &'a str,
}

impl fmt::Display for RationalFunctionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = &self.value.numerator;
        let den = &self.value.denominator;
        if den.is_one() {
            return write!(f, "{}", num.display(self.var));
        }
        if num.term_count() > 1 {
            write!(f, "({})", num.display(self.var))?;
        } else {
            write!(f, "{}", num.display(self.var))?;
        }
        if den.term_count() > 1 {
            write!(f, "/({})", den.display(self.var))
        } else {
            write!(f, "/{}", den.display(self.var))
        }
    }
}

impl Zero for RationalFunction {
    fn zero() -> Self {
        Self::from_poly(Poly::zero())
    }

    fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }
}

impl One for RationalFunction {
    fn one() -> Self {
        Self::from_poly(Poly::one())
    }
}

impl Add for &RationalFunction {
    type Output = RationalFunction;

    fn add(self, rhs: Self) -> RationalFunction {
        if self.denominator == rhs.denominator {
            let num = &self.numerator + &rhs.numerator;
            return RationalFunction::new(num, self.denominator.clone())
                .unwrap_or_else(RationalFunction::zero);
        }
        let num = &(&self.numerator * &rhs.denominator) + &(&rhs.numerator * &self.denominator);
        let den = &self.denominator * &rhs.denominator;
        RationalFunction::new(num, den).unwrap_or_else(RationalFunction::zero)
    }
}

impl Sub for &RationalFunction {
    type Output = RationalFunction;

    fn sub(self, rhs: Self) -> RationalFunction {
        self + &(-rhs)
    }
}

impl Mul for &RationalFunction {
    type Output = RationalFunction;

    fn mul(self, rhs: Self) -> RationalFunction {
        if self.is_polynomial() && rhs.is_polynomial() {
            return RationalFunction::from_poly(&self.numerator * &rhs.numerator);
        }
        let num = &self.numerator * &rhs.numerator;
        let den = &self.denominator * &rhs.denominator;
        RationalFunction::new(num, den).unwrap_or_else(RationalFunction::zero)
    }
}

impl Neg for &RationalFunction {
    type Output = RationalFunction;

    fn neg(self) -> RationalFunction {
        RationalFunction {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }
}

impl Neg for RationalFunction {
    type Output = RationalFunction;

    fn neg(self) -> RationalFunction {
        -&self
    }
}

forward_binop!(RationalFunction, Add, add);
forward_binop!(RationalFunction, Sub, sub);
forward_binop!(RationalFunction, Mul, mul);

impl From<Poly> for RationalFunction {
    fn from(p: Poly) -> Self {
        Self::from_poly(p)
    }
}
