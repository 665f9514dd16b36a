//! Syntax of stored operator expressions.
//!
//! The dialect is the one computer algebra systems print operators in:
//! `(t^2 + 1)*D^2 - 3*t*D + 1/2`, with `**` accepted for `^`, implicit
//! multiplication after a number (`3t^2`, `2(t + 1)`) and constructor calls
//! such as `Integer(5)`.

use std::ops::Range;

use chumsky::{error::SimpleReason, prelude::*};

pub type Span = Range<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// Decimal digits, kept as text so size is not limited.
    Integer(String),
    Symbol(String),
    Call { name: String, arg: Box<Expr> },
    Neg(Box<Expr>),
    /// A left-associative run of operators of one precedence level, such as
    /// `a - b + c` or `a * b / c`, with operands stored flat.
    Chain {
        head: Box<Expr>,
        tail: Vec<(BinOp, Expr)>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    #[must_use]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    fn binary(op: BinOp, lhs: Self, rhs: Self) -> Self {
        let span = lhs.span.start..rhs.span.end;
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    fn chain(head: Self, tail: Vec<(BinOp, Self)>) -> Self {
        let Some((_, last)) = tail.last() else {
            return head;
        };
        let span = head.span.start..last.span.end;
        Self::new(
            ExprKind::Chain {
                head: Box::new(head),
                tail,
            },
            span,
        )
    }

    fn raised(self, exponent: Option<Self>) -> Self {
        match exponent {
            Some(exponent) => Self::binary(BinOp::Pow, self, exponent),
            None => self,
        }
    }
}

fn signed(sign: char, span: Span, operand: Expr) -> Expr {
    if sign == '+' {
        return operand;
    }
    let span = span.start..operand.span.end;
    Expr::new(ExprKind::Neg(Box::new(operand)), span)
}

/// A syntax error at a character offset of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub offset: usize,
    pub reason: String,
}

/// Parses a complete expression. Offsets in errors count characters.
///
/// # Errors
/// Returns the first syntax error encountered.
pub fn parse(text: &str) -> Result<Expr, SyntaxError> {
    parser().parse(text).map_err(|errors| {
        errors
            .into_iter()
            .min_by_key(|error| error.span().start)
            .map_or_else(
                || SyntaxError {
                    offset: 0,
                    reason: "invalid expression".to_string(),
                },
                |error| SyntaxError {
                    offset: error.span().start,
                    reason: describe(&error),
                },
            )
    })
}

fn parser() -> impl Parser<char, Expr, Error = Simple<char>> {
    expression().then_ignore(end())
}

fn expression() -> impl Parser<char, Expr, Error = Simple<char>> + Clone {
    recursive(|expr| {
        let op = |c: char| just::<char, char, Simple<char>>(c).padded();
        let ident = text::ident::<char, Simple<char>>();

        let number = filter::<char, _, Simple<char>>(char::is_ascii_digit)
            .repeated()
            .at_least(1)
            .collect::<String>()
            .map_with_span(|digits, span| Expr::new(ExprKind::Integer(digits), span))
            .labelled("number");
        let symbol =
            ident.map_with_span(|name, span| Expr::new(ExprKind::Symbol(name), span));
        let group = expr.delimited_by(just('('), just(')'));
        let call = ident
            .then(group.clone())
            .map_with_span(|(name, arg), span| {
                Expr::new(
                    ExprKind::Call {
                        name,
                        arg: Box::new(arg),
                    },
                    span,
                )
            });
        let atom = choice((call, symbol.clone(), group.clone(), number.clone()));
        let base = symbol.or(group);
        let sign = op('-')
            .or(op('+'))
            .map_with_span(|c, span: Span| (c, span));

        let unary = recursive(move |unary| {
            let raise = just("**")
                .or(just("^"))
                .padded()
                .ignore_then(unary)
                .or_not();
            let implicit = number
                .then(base.then(raise.clone()))
                .map(|(coefficient, (base, exponent))| {
                    Expr::binary(BinOp::Mul, coefficient, base.raised(exponent))
                });
            let power = implicit
                .or(atom.then(raise).map(|(base, exponent)| base.raised(exponent)))
                .padded();
            sign.clone()
                .repeated()
                .then(power)
                .foldr(|(c, span), operand| signed(c, span, operand))
        });

        let product = unary
            .clone()
            .then(
                op('*')
                    .to(BinOp::Mul)
                    .or(op('/').to(BinOp::Div))
                    .then(unary)
                    .repeated(),
            )
            .map(|(head, tail)| Expr::chain(head, tail));

        product
            .clone()
            .then(
                op('+')
                    .to(BinOp::Add)
                    .or(op('-').to(BinOp::Sub))
                    .then(product)
                    .repeated(),
            )
            .map(|(head, tail)| Expr::chain(head, tail))
    })
}

fn describe(error: &Simple<char>) -> String {
    match error.reason() {
        SimpleReason::Custom(message) => return message.clone(),
        SimpleReason::Unclosed { delimiter, .. } => {
            return format!("unclosed delimiter '{delimiter}'")
        }
        SimpleReason::Unexpected => {}
    }

    let found = error
        .found()
        .map_or_else(|| "end of input".to_string(), |c| format!("'{c}'"));
    let mut expected: Vec<String> = error
        .expected()
        .map(|item| match item {
            Some(c) => format!("'{c}'"),
            None => "end of input".to_string(),
        })
        .collect();
    if let Some(label) = error.label() {
        expected.push(label.to_string());
    }
    expected.sort();
    expected.dedup();

    if expected.is_empty() {
        format!("unexpected {found}")
    } else {
        format!("unexpected {found}, expected {}", expected.join(" or "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(op: BinOp) -> &'static str {
        match op {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }

    fn render(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Integer(digits) => digits.clone(),
            ExprKind::Symbol(name) => name.clone(),
            ExprKind::Call { name, arg } => format!("{name}({})", render(arg)),
            ExprKind::Neg(inner) => format!("(-{})", render(inner)),
            ExprKind::Chain { head, tail } => {
                let mut out = format!("({}", render(head));
                for (op, operand) in tail {
                    out.push_str(&format!(" {} {}", symbol(*op), render(operand)));
                }
                out.push(')');
                out
            }
            ExprKind::Binary { op, lhs, rhs } => {
                format!("({} {} {})", render(lhs), symbol(*op), render(rhs))
            }
        }
    }

    fn shape(text: &str) -> String {
        render(&parse(text).unwrap())
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(shape("t^2*D + 3"), "(((t ^ 2) * D) + 3)");
        assert_eq!(shape("1 - 2 - 3"), "(1 - 2 - 3)");
        assert_eq!(shape("2^3^2"), "(2 ^ (3 ^ 2))");
        assert_eq!(shape("-t^2"), "(-(t ^ 2))");
        assert_eq!(shape("t**-1"), "(t ^ (-1))");
        assert_eq!(shape("6/2/3"), "(6 / 2 / 3)");
        assert_eq!(shape("t*D - 2/t + 1"), "((t * D) - (2 / t) + 1)");
    }

    #[test]
    fn implicit_multiplication_binds_to_the_power() {
        assert_eq!(shape("3t^2"), "(3 * (t ^ 2))");
        assert_eq!(shape("2(t + 1)"), "(2 * (t + 1))");
        assert_eq!(shape("12 * t"), "(12 * t)");
    }

    #[test]
    fn calls_and_whitespace() {
        assert_eq!(shape("  Integer( 42 ) * D "), "(Integer(42) * D)");
        assert_eq!(shape("(t - 1)*D^2 + -+-t"), "(((t - 1) * (D ^ 2)) + (-(-t)))");
    }

    #[test]
    fn spans_cover_the_source() {
        let expr = parse("t + 10").unwrap();
        assert_eq!(expr.span, 0..6);
        let ExprKind::Chain { tail, .. } = expr.kind else {
            panic!("expected a sum");
        };
        assert_eq!(tail[0].1.span, 4..6);
    }

    #[test]
    fn reports_offsets_of_syntax_errors() {
        let err = parse("t^2*D + ").unwrap_err();
        assert!(err.offset >= 6, "{err:?}");
        assert!(err.reason.contains("end of input"), "{}", err.reason);

        let err = parse("t ^^ 2").unwrap_err();
        assert!((2..=3).contains(&err.offset), "{err:?}");

        let err = parse("(t + 1").unwrap_err();
        assert_eq!(err.offset, 6);

        assert!(parse("").is_err());
        assert!(parse("3 t").is_err());
    }

    #[test]
    fn long_sums_stay_flat() {
        let text = (0..10_000)
            .map(|i| format!("{i}*t^{}", i % 7))
            .collect::<Vec<_>>()
            .join(" + ");
        let expr = parse(&text).unwrap();
        let ExprKind::Chain { head, tail } = &expr.kind else {
            panic!("expected a sum");
        };
        assert!(matches!(head.kind, ExprKind::Chain { .. }));
        assert_eq!(tail.len(), 9_999);
        assert!(tail.iter().all(|(op, _)| *op == BinOp::Add));
        assert_eq!(expr.span, 0..text.len());
    }
}
