//! Exact arithmetic for linear differential operators over Q.
//!
//! - [`Rational`]: arbitrary precision rationals (wrapping `dashu`)
//! - [`Poly`] and [`RationalFunction`]: the two coefficient rings
//! - [`OreOperator`]: operators `sum c_i D^i` with `D * a = a * D + a'`
//! - [`OreAlgebra`]: generator names and the canonical text rendering

macro_rules! forward_binop {
    ($ty:ty, $tr:ident, $method:ident) => {
        impl std::ops::$tr for $ty {
            type Output = $ty;

            fn $method(self, rhs: $ty) -> $ty {
                std::ops::$tr::$method(&self, &rhs)
            }
        }

        impl std::ops::$tr<&$ty> for $ty {
            type Output = $ty;

            fn $method(self, rhs: &$ty) -> $ty {
                std::ops::$tr::$method(&self, rhs)
            }
        }
    };
}

mod algebra;
mod coefficient;
mod error;
mod operator;
mod poly;
mod rational;
mod rational_function;

pub use algebra::{CoefficientDisplay, OperatorDisplay, OreAlgebra, PolyAlgebra, RationalAlgebra};
pub use coefficient::Coefficient;
pub use error::AlgebraError;
pub use operator::OreOperator;
pub use poly::{Poly, PolyDisplay};
pub use rational::Rational;
pub use rational_function::{RationalFunction, RationalFunctionDisplay};

pub use dashu::integer::IBig;
pub use num_traits::{One, Zero};
