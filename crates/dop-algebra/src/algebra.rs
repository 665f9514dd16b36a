use std::fmt;
use std::marker::PhantomData;

use crate::{AlgebraError, Coefficient, OreOperator, Poly, RationalFunction};

/// Differential operators with polynomial coefficients, `Q[t]<D>`.
pub type PolyAlgebra = OreAlgebra<Poly>;

/// Differential operators with rational-function coefficients, `Q(t)<D>`.
pub type RationalAlgebra = OreAlgebra<RationalFunction>;

/// The ring of differential operators over a coefficient ring `C`, together
/// with the names its two generators are printed and parsed as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OreAlgebra<C> {
    variable: String,
    derivation: String,
    _coefficients: PhantomData<fn() -> C>,
}

impl<C: Coefficient> OreAlgebra<C> {
    /// # Errors
    /// Returns an error if either name is not an identifier or both names
    /// are equal.
    pub fn new(variable: &str, derivation: &str) -> Result<Self, AlgebraError> {
        for name in [variable, derivation] {
            if !is_identifier(name) {
                return Err(AlgebraError::InvalidGeneratorName {
                    name: name.to_string(),
                });
            }
        }
        if variable == derivation {
            return Err(AlgebraError::GeneratorNameClash {
                name: variable.to_string(),
            });
        }
        Ok(Self {
            variable: variable.to_string(),
            derivation: derivation.to_string(),
            _coefficients: PhantomData,
        })
    }

    /// Name of the base-ring generator, e.g. `t`.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Name of the derivation generator, e.g. `D`.
    #[must_use]
    pub fn derivation(&self) -> &str {
        &self.derivation
    }

    #[must_use]
    pub fn base_gen(&self) -> OreOperator<C> {
        OreOperator::from_coefficient(C::variable())
    }

    #[must_use]
    pub fn derivation_gen(&self) -> OreOperator<C> {
        OreOperator::derivation()
    }

    /// Renders `op` in the same dialect stored artifacts are written in,
    /// highest order first, e.g. `(t^2 + 1)*D^2 - 3*t*D + 1/2`.
    #[must_use]
    pub fn display<'a>(&'a self, op: &'a OreOperator<C>) -> OperatorDisplay<'a, C> {
        OperatorDisplay { algebra: self, op }
    }

    /// Renders a single coefficient.
    #[must_use]
    pub fn display_coefficient<'a>(&'a self, c: &'a C) -> CoefficientDisplay<'a, C> {
        CoefficientDisplay {
            var: &self.variable,
            value: c,
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub struct CoefficientDisplay<'a, C> {
    var: &'a str,
    value: &'a C,
}

impl<C: Coefficient> fmt::Display for CoefficientDisplay<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.write_with(self.var, f)
    }
}

pub struct OperatorDisplay<'a, C> {
    algebra: &'a OreAlgebra<C>,
    op: &'a OreOperator<C>,
}

impl<C: Coefficient> fmt::Display for OperatorDisplay<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.algebra.derivation.as_str();
        let mut first = true;
        for (i, c) in self.op.coefficients().iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            let term = render_term(self.algebra, c, d, i);
            match term.strip_prefix('-') {
                Some(rest) if !first => write!(f, " - {rest}")?,
                _ if !first => write!(f, " + {term}")?,
                _ => f.write_str(&term)?,
            }
            first = false;
        }
        if first {
            f.write_str("0")?;
        }
        Ok(())
    }
}

fn render_term<C: Coefficient>(algebra: &OreAlgebra<C>, c: &C, d: &str, order: usize) -> String {
    let coefficient = algebra.display_coefficient(c).to_string();
    let power = match order {
        0 => return coefficient,
        1 => d.to_string(),
        n => format!("{d}^{n}"),
    };
    if c.is_one() {
        power
    } else if (-c.clone()).is_one() {
        format!("-{power}")
    } else if c.is_single_term() {
        format!("{coefficient}*{power}")
    } else {
        format!("({coefficient})*{power}")
    }
}
