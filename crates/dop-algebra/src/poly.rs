//! Dense univariate polynomials over Q.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Zero};

use crate::Rational;

/// A dense univariate polynomial with rational coefficients.
///
/// Coefficients are stored in ascending degree order with no trailing zeros,
/// so the zero polynomial has an empty coefficient vector.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Poly {
    coeffs: Vec<Rational>,
}

impl Poly {
    #[must_use]
    pub fn new(mut coeffs: Vec<Rational>) -> Self {
        while coeffs.last().is_some_and(Zero::is_zero) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    #[must_use]
    pub fn constant(c: Rational) -> Self {
        Self::new(vec![c])
    }

    /// The generator `t`.
    #[must_use]
    pub fn x() -> Self {
        Self::monomial(Rational::one(), 1)
    }

    /// `c * t^n`.
    #[must_use]
    pub fn monomial(c: Rational, n: usize) -> Self {
        let mut coeffs = vec![Rational::zero(); n + 1];
        coeffs[n] = c;
        Self::new(coeffs)
    }

    /// Degree of the polynomial, `None` for zero.
    #[must_use]
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    #[must_use]
    pub fn coeff(&self, i: usize) -> Rational {
        self.coeffs.get(i).cloned().unwrap_or_else(Rational::zero)
    }

    #[must_use]
    pub fn coeffs(&self) -> &[Rational] {
        &self.coeffs
    }

    #[must_use]
    pub fn leading_coeff(&self) -> Option<&Rational> {
        self.coeffs.last()
    }

    /// Returns the constant value when the degree is at most zero.
    #[must_use]
    pub fn as_constant(&self) -> Option<Rational> {
        match self.coeffs.len() {
            0 => Some(Rational::zero()),
            1 => Some(self.coeffs[0].clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn scale(&self, c: &Rational) -> Self {
        Self::new(self.coeffs.iter().map(|a| a * c).collect())
    }

    #[must_use]
    pub fn derivative(&self) -> Self {
        Self::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * &Rational::from(i as i64))
                .collect(),
        )
    }

    /// Scales the polynomial so its leading coefficient is one.
    #[must_use]
    pub fn monic(&self) -> Self {
        match self.leading_coeff().and_then(Rational::recip) {
            Some(inv) => self.scale(&inv),
            None => Self::zero(),
        }
    }

    /// Euclidean division, `None` when dividing by zero.
    #[must_use]
    pub fn div_rem(&self, divisor: &Self) -> Option<(Self, Self)> {
        let divisor_degree = divisor.degree()?;
        let lead_inv = divisor.leading_coeff().and_then(Rational::recip)?;

        let mut rem = self.coeffs.clone();
        let quotient_len = rem.len().saturating_sub(divisor_degree);
        let mut quotient = vec![Rational::zero(); quotient_len];
        for shift in (0..quotient_len).rev() {
            let top = &rem[shift + divisor_degree] * &lead_inv;
            if top.is_zero() {
                continue;
            }
            for (j, d) in divisor.coeffs.iter().enumerate() {
                rem[shift + j] = &rem[shift + j] - &(&top * d);
            }
            quotient[shift] = top;
        }
        rem.truncate(divisor_degree);
        Some((Self::new(quotient), Self::new(rem)))
    }

    /// Monic greatest common divisor.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.clone();
        let mut b = other.clone();
        while let Some((_, r)) = a.div_rem(&b) {
            a = b;
            b = r;
        }
        a.monic()
    }

    /// Quotient when `divisor` divides `self` exactly.
    #[must_use]
    pub fn exact_div(&self, divisor: &Self) -> Option<Self> {
        let (q, r) = self.div_rem(divisor)?;
        r.is_zero().then_some(q)
    }

    #[must_use]
    pub fn pow(&self, mut exp: u32) -> Self {
        let mut base = self.clone();
        let mut acc = Self::one();
        while exp > 0 {
            if exp & 1 == 1 {
                acc = &acc * &base;
            }
            base = &base * &base;
            exp >>= 1;
        }
        acc
    }

    /// Number of nonzero terms.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.coeffs.iter().filter(|c| !c.is_zero()).count()
    }

    /// Renders the polynomial in descending degree order with `var` as the
    /// variable name, e.g. `t^2 - 3/4*t + 1`.
    #[must_use]
    pub fn display<'a>(&'a self, var: &'a str) -> PolyDisplay<'a> {
        PolyDisplay { poly: self, var }
    }
}

pub struct PolyDisplay<'a> {
    poly: &'a Poly,
    var: &'a str,
}

impl fmt::Display for PolyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (i, c) in self.poly.coeffs.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            let magnitude = c.abs();
            match (first, c.is_negative()) {
                (true, true) => f.write_str("-")?,
                (true, false) => {}
                (false, true) => f.write_str(" - ")?,
                (false, false) => f.write_str(" + ")?,
            }
            first = false;
            match i {
                0 => write!(f, "{magnitude}")?,
                _ => {
                    if !magnitude.is_one() {
                        write!(f, "{magnitude}*")?;
                    }
                    f.write_str(self.var)?;
                    if i > 1 {
                        write!(f, "^{i}")?;
                    }
                }
            }
        }
        if first {
            f.write_str("0")?;
        }
        Ok(())
    }
}

impl Zero for Poly {
    fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }
}

impl One for Poly {
    fn one() -> Self {
        Self::constant(Rational::one())
    }
}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, rhs: Self) -> Poly {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        Poly::new((0..len).map(|i| &self.coeff(i) + &rhs.coeff(i)).collect())
    }
}

impl Sub for &Poly {
    type Output = Poly;

    fn sub(self, rhs: Self) -> Poly {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        Poly::new((0..len).map(|i| &self.coeff(i) - &rhs.coeff(i)).collect())
    }
}

impl Mul for &Poly {
    type Output = Poly;

    fn mul(self, rhs: Self) -> Poly {
        if self.is_zero() || rhs.is_zero() {
            return Poly::zero();
        }
        let mut out = vec![Rational::zero(); self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                out[i + j] = &out[i + j] + &(a * b);
            }
        }
        Poly::new(out)
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        Poly::new(self.coeffs.iter().map(|c| -c).collect())
    }
}

impl Neg for Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        -&self
    }
}

forward_binop!(Poly, Add, add);
forward_binop!(Poly, Sub, sub);
forward_binop!(Poly, Mul, mul);

impl From<Rational> for Poly {
    fn from(c: Rational) -> Self {
        Self::constant(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coeffs: &[i64]) -> Poly {
        Poly::new(coeffs.iter().map(|&n| Rational::from(n)).collect())
    }

    #[test]
    fn test_basic_ops() {
        let p = poly(&[1, 2, 1]);
        let q = poly(&[-1, 1]);
        assert_eq!(&p + &q, poly(&[0, 3, 1]));
        assert_eq!(&p * &q, poly(&[-1, -1, 1, 1]));
        assert!((&p - &p).is_zero());
    }

    #[test]
    fn test_derivative() {
        // d/dt (t^3 + 2t) = 3t^2 + 2
        assert_eq!(poly(&[0, 2, 0, 1]).derivative(), poly(&[2, 0, 3]));
        assert!(poly(&[5]).derivative().is_zero());
    }

    #[test]
    fn test_div_rem_and_gcd() {
        // (t^2 - 1) / (t - 1) = t + 1
        let (q, r) = poly(&[-1, 0, 1]).div_rem(&poly(&[-1, 1])).unwrap();
        assert_eq!(q, poly(&[1, 1]));
        assert!(r.is_zero());

        let g = poly(&[-2, 0, 2]).gcd(&poly(&[3, 3]));
        assert_eq!(g, poly(&[1, 1]));

        assert!(poly(&[1, 1]).div_rem(&Poly::zero()).is_none());
        assert!(poly(&[1, 0, 1]).exact_div(&poly(&[1, 1])).is_none());
    }

    #[test]
    fn test_display() {
        let p = Poly::new(vec![
            Rational::from(1),
            Rational::from_i64(-3, 4),
            Rational::from(0),
            Rational::from(-1),
        ]);
        assert_eq!(p.display("t").to_string(), "-t^3 - 3/4*t + 1");
        assert_eq!(Poly::zero().display("t").to_string(), "0");
        assert_eq!(Poly::x().pow(5).display("x").to_string(), "x^5");
    }
}
