//! Interpreting parsed expressions in an Ore algebra.

use std::collections::HashMap;

use dop_algebra::{Coefficient, OreAlgebra, OreOperator, Rational};

use crate::expr::{BinOp, Expr, ExprKind, Span};

/// Name of the arbitrary-precision integer constructor stored artifacts may
/// call, as in `Integer(3)`.
pub const INTEGER_CONSTRUCTOR: &str = "Integer";

#[derive(Debug, Clone, PartialEq)]
pub enum Binding<C> {
    Value(OreOperator<C>),
    IntegerConstructor,
}

/// The names an expression may refer to: the two generators of the algebra
/// and the integer constructor.
#[derive(Debug, Clone)]
pub struct Bindings<C> {
    algebra: OreAlgebra<C>,
    names: HashMap<String, Binding<C>>,
}

impl<C: Coefficient> Bindings<C> {
    #[must_use]
    pub fn for_algebra(algebra: &OreAlgebra<C>) -> Self {
        let mut names = HashMap::new();
        names.insert(
            INTEGER_CONSTRUCTOR.to_string(),
            Binding::IntegerConstructor,
        );
        names.insert(
            algebra.variable().to_string(),
            Binding::Value(algebra.base_gen()),
        );
        names.insert(
            algebra.derivation().to_string(),
            Binding::Value(algebra.derivation_gen()),
        );
        Self {
            algebra: algebra.clone(),
            names,
        }
    }

    #[must_use]
    pub fn algebra(&self) -> &OreAlgebra<C> {
        &self.algebra
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Binding<C>> {
        self.names.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub span: Span,
    pub reason: String,
}

impl EvalError {
    fn new(span: &Span, reason: impl Into<String>) -> Self {
        Self {
            span: span.clone(),
            reason: reason.into(),
        }
    }
}

/// Evaluates `expr` with ring arithmetic in the algebra of `bindings`.
///
/// # Errors
/// Unknown names, misuse of the integer constructor, division by zero or
/// by an operator of positive order, and non-integer exponents.
pub fn evaluate<C: Coefficient>(
    expr: &Expr,
    bindings: &Bindings<C>,
) -> Result<OreOperator<C>, EvalError> {
    match &expr.kind {
        ExprKind::Integer(digits) => Rational::parse_integer(digits)
            .map(|n| OreOperator::from_coefficient(C::from_rational(n)))
            .ok_or_else(|| EvalError::new(&expr.span, format!("invalid integer '{digits}'"))),
        ExprKind::Symbol(name) => match bindings.get(name) {
            Some(Binding::Value(value)) => Ok(value.clone()),
            Some(Binding::IntegerConstructor) => Err(EvalError::new(
                &expr.span,
                format!("'{name}' must be called with an argument"),
            )),
            None => Err(EvalError::new(
                &expr.span,
                format!("unknown symbol '{name}'"),
            )),
        },
        ExprKind::Call { name, arg } => match bindings.get(name) {
            Some(Binding::IntegerConstructor) => {
                let value = evaluate(arg, bindings)?;
                let is_integer = value
                    .as_coefficient()
                    .and_then(|c| c.as_constant())
                    .is_some_and(|c| c.is_integer());
                if is_integer {
                    Ok(value)
                } else {
                    Err(EvalError::new(
                        &arg.span,
                        format!("'{name}' expects an integer argument"),
                    ))
                }
            }
            Some(Binding::Value(_)) => Err(EvalError::new(
                &expr.span,
                format!("'{name}' is not callable"),
            )),
            None => Err(EvalError::new(
                &expr.span,
                format!("unknown function '{name}'"),
            )),
        },
        ExprKind::Neg(inner) => Ok(-evaluate(inner, bindings)?),
        ExprKind::Chain { head, tail } => {
            let mut acc = evaluate(head, bindings)?;
            for (op, operand) in tail {
                let right = evaluate(operand, bindings)?;
                acc = apply(*op, &acc, &right, &operand.span, bindings)?;
            }
            Ok(acc)
        }
        ExprKind::Binary { op, lhs, rhs } => {
            let left = evaluate(lhs, bindings)?;
            let right = evaluate(rhs, bindings)?;
            apply(*op, &left, &right, &rhs.span, bindings)
        }
    }
}

fn apply<C: Coefficient>(
    op: BinOp,
    left: &OreOperator<C>,
    right: &OreOperator<C>,
    span: &Span,
    bindings: &Bindings<C>,
) -> Result<OreOperator<C>, EvalError> {
    match op {
        BinOp::Add => Ok(left + right),
        BinOp::Sub => Ok(left - right),
        BinOp::Mul => Ok(left * right),
        BinOp::Div => divide(left, right, span, bindings.algebra()),
        BinOp::Pow => raise(left, right, span),
    }
}

/// `left / right` for an order-0 `right`: right multiplication by its
/// inverse, or exact division in the coefficient ring.
fn divide<C: Coefficient>(
    left: &OreOperator<C>,
    right: &OreOperator<C>,
    span: &Span,
    algebra: &OreAlgebra<C>,
) -> Result<OreOperator<C>, EvalError> {
    let Some(divisor) = right.as_coefficient() else {
        return Err(EvalError::new(
            span,
            "cannot divide by an operator of positive order",
        ));
    };
    if divisor.is_zero() {
        return Err(EvalError::new(span, "division by zero"));
    }
    if let Some(inverse) = divisor.inverse() {
        return Ok(left * &OreOperator::from_coefficient(inverse));
    }
    left.as_coefficient()
        .and_then(|dividend| dividend.exact_div(&divisor))
        .map(OreOperator::from_coefficient)
        .ok_or_else(|| {
            EvalError::new(
                span,
                format!(
                    "'{}' is not invertible in the coefficient ring",
                    algebra.display_coefficient(&divisor)
                ),
            )
        })
}

fn raise<C: Coefficient>(
    base: &OreOperator<C>,
    exponent: &OreOperator<C>,
    span: &Span,
) -> Result<OreOperator<C>, EvalError> {
    let Some(n) = exponent
        .as_coefficient()
        .and_then(|c| c.as_constant())
        .filter(Rational::is_integer)
        .and_then(|c| c.to_i64())
    else {
        return Err(EvalError::new(span, "exponent must be an integer"));
    };
    let magnitude = u32::try_from(n.unsigned_abs())
        .map_err(|_| EvalError::new(span, "exponent is too large"))?;
    if n >= 0 {
        return Ok(base.pow(magnitude));
    }
    base.as_coefficient()
        .filter(|c| !c.is_zero())
        .and_then(|c| c.inverse())
        .map(|inverse| OreOperator::from_coefficient(inverse).pow(magnitude))
        .ok_or_else(|| EvalError::new(span, "negative exponent of a non-invertible base"))
}

#[cfg(test)]
mod tests {
    use dop_algebra::{Poly, PolyAlgebra, RationalAlgebra, RationalFunction, Zero};

    use super::*;
    use crate::expr::parse;

    fn eval_poly(text: &str) -> Result<OreOperator<Poly>, EvalError> {
        let algebra = PolyAlgebra::new("t", "D").unwrap();
        evaluate(&parse(text).unwrap(), &Bindings::for_algebra(&algebra))
    }

    fn show(op: &OreOperator<Poly>) -> String {
        PolyAlgebra::new("t", "D").unwrap().display(op).to_string()
    }

    #[test]
    fn evaluates_with_the_leibniz_rule() {
        assert_eq!(show(&eval_poly("D*t").unwrap()), "t*D + 1");
        assert_eq!(show(&eval_poly("t^2*D + 3").unwrap()), "t^2*D + 3");
        assert_eq!(show(&eval_poly("3t^2 - 2(t + 1)").unwrap()), "3*t^2 - 2*t - 2");
    }

    #[test]
    fn divides_by_constants_and_exact_factors() {
        assert_eq!(show(&eval_poly("3/4*t").unwrap()), "3/4*t");
        assert_eq!(show(&eval_poly("D/2").unwrap()), "1/2*D");
        assert_eq!(show(&eval_poly("(t^2 - 1)/(t - 1)").unwrap()), "t + 1");

        let err = eval_poly("D/t").unwrap_err();
        assert!(err.reason.contains("not invertible"), "{}", err.reason);
        assert_eq!(err.span, 2..3);
        assert!(eval_poly("t/D").is_err());
        assert_eq!(eval_poly("1/(t - t)").unwrap_err().reason, "division by zero");
    }

    #[test]
    fn exponents_must_be_integers() {
        assert_eq!(show(&eval_poly("2^-2").unwrap()), "1/4");
        assert_eq!(show(&eval_poly("D**2").unwrap()), "D^2");
        assert!(eval_poly("t^(1/2)").is_err());
        assert!(eval_poly("t^D").is_err());
        assert!(eval_poly("t^-1").is_err());
    }

    #[test]
    fn integer_constructor_only_accepts_integers() {
        assert_eq!(show(&eval_poly("Integer(7)*D").unwrap()), "7*D");
        assert!(eval_poly("Integer(1/2)").is_err());
        assert!(eval_poly("Integer").is_err());
        assert!(eval_poly("t(2)").is_err());
    }

    #[test]
    fn unknown_symbols_are_reported_with_their_span() {
        let err = eval_poly("t + x").unwrap_err();
        assert_eq!(err.span, 4..5);
        assert_eq!(err.reason, "unknown symbol 'x'");
    }

    #[test]
    fn fraction_field_inverts_the_variable() {
        let algebra = RationalAlgebra::new("t", "D").unwrap();
        let bindings = Bindings::for_algebra(&algebra);
        // D * (1/t) = (1/t)*D - 1/t^2
        let op = evaluate(&parse("D/t + t^-2").unwrap(), &bindings).unwrap();
        let inv_t = RationalFunction::from_poly(Poly::x()).inverse().unwrap();
        assert_eq!(op, OreOperator::new(vec![RationalFunction::zero(), inv_t]));
    }

    #[test]
    fn long_sums_evaluate_without_deep_recursion() {
        let text = (1..=10_000)
            .map(|i| format!("{i}*t^{}*D^{}", i % 5, i % 3))
            .collect::<Vec<_>>()
            .join(" + ");
        let op = eval_poly(&text).unwrap();
        assert_eq!(op.order(), Some(2));

        let differences = std::iter::once("t")
            .chain(std::iter::repeat("1").take(9_999))
            .collect::<Vec<_>>()
            .join(" - ");
        assert_eq!(show(&eval_poly(&differences).unwrap()), "t - 9999");
    }
}
