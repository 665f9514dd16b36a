//! Linear differential operators `sum c_i D^i`.

use std::ops::{Add, Mul, Neg, Sub};

use num_traits::Zero;

use crate::Coefficient;

/// An element of the Ore algebra `C<D>` where `D` acts on the coefficient
/// ring as `d/dt`.
///
/// Coefficients are stored by ascending order of `D`, coefficients on the
/// left: `coeffs[i] * D^i`. Trailing zero coefficients are trimmed so the
/// zero operator has no coefficients and equality is structural.
#[derive(Clone, PartialEq, Debug)]
pub struct OreOperator<C> {
    coeffs: Vec<C>,
}

impl<C: Coefficient> OreOperator<C> {
    #[must_use]
    pub fn new(mut coeffs: Vec<C>) -> Self {
        while coeffs.last().is_some_and(Zero::is_zero) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    #[must_use]
    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    #[must_use]
    pub fn one() -> Self {
        Self::from_coefficient(C::one())
    }

    #[must_use]
    pub fn from_coefficient(c: C) -> Self {
        Self::new(vec![c])
    }

    /// The derivation generator `D`.
    #[must_use]
    pub fn derivation() -> Self {
        Self::new(vec![C::zero(), C::one()])
    }

    /// Order in `D`, `None` for the zero operator.
    #[must_use]
    pub fn order(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    #[must_use]
    pub fn coefficients(&self) -> &[C] {
        &self.coeffs
    }

    #[must_use]
    pub fn coefficient(&self, i: usize) -> C {
        self.coeffs.get(i).cloned().unwrap_or_else(C::zero)
    }

    /// The operator as an element of the coefficient ring when its order is
    /// at most zero.
    #[must_use]
    pub fn as_coefficient(&self) -> Option<C> {
        match self.coeffs.len() {
            0 => Some(C::zero()),
            1 => Some(self.coeffs[0].clone()),
            _ => None,
        }
    }

    /// `c * self`
    #[must_use]
    pub fn scale_left(&self, c: &C) -> Self {
        Self::new(self.coeffs.iter().map(|a| c.clone() * a).collect())
    }

    /// `D * self`, applying `D * a = a * D + a'` to every term.
    #[must_use]
    pub fn lift(&self) -> Self {
        let mut out = vec![C::zero(); self.coeffs.len() + 1];
        for (j, b) in self.coeffs.iter().enumerate() {
            out[j] = out[j].clone() + b.derivative();
            out[j + 1] = out[j + 1].clone() + b;
        }
        Self::new(out)
    }

    #[must_use]
    pub fn pow(&self, mut exp: u32) -> Self {
        let mut base = self.clone();
        let mut acc = Self::one();
        while exp > 0 {
            if exp & 1 == 1 {
                acc = &acc * &base;
            }
            exp >>= 1;
            if exp > 0 {
                base = &base * &base;
            }
        }
        acc
    }
}

impl<C: Coefficient> Add for &OreOperator<C> {
    type Output = OreOperator<C>;

    fn add(self, rhs: Self) -> OreOperator<C> {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        OreOperator::new(
            (0..len)
                .map(|i| self.coefficient(i) + rhs.coefficient(i))
                .collect(),
        )
    }
}

impl<C: Coefficient> Sub for &OreOperator<C> {
    type Output = OreOperator<C>;

    fn sub(self, rhs: Self) -> OreOperator<C> {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        OreOperator::new(
            (0..len)
                .map(|i| self.coefficient(i) - rhs.coefficient(i))
                .collect(),
        )
    }
}

impl<C: Coefficient> Mul for &OreOperator<C> {
    type Output = OreOperator<C>;

    /// `(sum a_i D^i) * M = sum a_i * (D^i * M)`
    fn mul(self, rhs: Self) -> OreOperator<C> {
        if self.is_zero() || rhs.is_zero() {
            return OreOperator::zero();
        }
        let mut acc = OreOperator::zero();
        let mut shifted = rhs.clone();
        for (i, a) in self.coeffs.iter().enumerate() {
            if i > 0 {
                shifted = shifted.lift();
            }
            if !a.is_zero() {
                acc = &acc + &shifted.scale_left(a);
            }
        }
        acc
    }
}

impl<C: Coefficient> Neg for &OreOperator<C> {
    type Output = OreOperator<C>;

    fn neg(self) -> OreOperator<C> {
        OreOperator::new(self.coeffs.iter().map(|c| -c.clone()).collect())
    }
}

impl<C: Coefficient> Neg for OreOperator<C> {
    type Output = OreOperator<C>;

    fn neg(self) -> OreOperator<C> {
        -&self
    }
}

macro_rules! forward_operator_binop {
    ($tr:ident, $method:ident) => {
        impl<C: Coefficient> $tr for OreOperator<C> {
            type Output = OreOperator<C>;

            fn $method(self, rhs: OreOperator<C>) -> OreOperator<C> {
                $tr::$method(&self, &rhs)
            }
        }

        impl<C: Coefficient> $tr<&OreOperator<C>> for OreOperator<C> {
            type Output = OreOperator<C>;

            fn $method(self, rhs: &OreOperator<C>) -> OreOperator<C> {
                $tr::$method(&self, rhs)
            }
        }
    };
}

forward_operator_binop!(Add, add);
forward_operator_binop!(Sub, sub);
forward_operator_binop!(Mul, mul);

impl<C: Coefficient> From<C> for OreOperator<C> {
    fn from(c: C) -> Self {
        Self::from_coefficient(c)
    }
}
