//! Reading operator expressions out of artifact streams.

use std::io::{self, BufRead};

use dop_algebra::{Coefficient, OreAlgebra, OreOperator};

use crate::{
    eval::{self, Bindings},
    expr, StoreError,
};

/// Characters shown on each side of an error offset.
const EXCERPT_RADIUS: usize = 10;

#[derive(Debug, Clone)]
pub struct ExpressionLoader<C> {
    bindings: Bindings<C>,
}

impl<C: Coefficient> ExpressionLoader<C> {
    #[must_use]
    pub fn new(algebra: &OreAlgebra<C>) -> Self {
        Self {
            bindings: Bindings::for_algebra(algebra),
        }
    }

    #[must_use]
    pub fn bindings(&self) -> &Bindings<C> {
        &self.bindings
    }

    /// Drains `reader` and evaluates the expression it holds.
    ///
    /// # Errors
    /// [`StoreError::Read`] when the stream fails, otherwise
    /// [`StoreError::MalformedExpression`] for syntax and evaluation errors.
    pub fn load<R: BufRead>(&self, reader: R) -> Result<OreOperator<C>, StoreError> {
        let text = read_expression(reader).map_err(|source| StoreError::Read { source })?;
        self.parse(&text)
    }

    /// # Errors
    /// See [`ExpressionLoader::load`].
    pub fn parse(&self, text: &str) -> Result<OreOperator<C>, StoreError> {
        let tree = expr::parse(text).map_err(|err| malformed(text, err.offset, err.reason))?;
        eval::evaluate(&tree, &self.bindings)
            .map_err(|err| malformed(text, err.span.start, err.reason))
    }
}

/// Joins the lines of `reader` after stripping every trailing `\r`, `\n`
/// and `\` from each, so backslash continuations disappear.
///
/// # Errors
/// Propagates read failures, including invalid UTF-8.
pub fn read_expression<R: BufRead>(mut reader: R) -> io::Result<String> {
    let mut joined = String::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        joined.push_str(line.trim_end_matches(|c| matches!(c, '\r' | '\n' | '\\')));
    }
    Ok(joined)
}

fn malformed(text: &str, offset: usize, reason: String) -> StoreError {
    StoreError::MalformedExpression {
        offset,
        excerpt: excerpt(text, offset),
        reason,
    }
}

fn excerpt(text: &str, offset: usize) -> String {
    text.chars()
        .skip(offset.saturating_sub(EXCERPT_RADIUS))
        .take(offset.min(EXCERPT_RADIUS) + EXCERPT_RADIUS)
        .collect()
}

#[cfg(test)]
mod tests {
    use dop_algebra::PolyAlgebra;

    use super::*;

    fn loader() -> ExpressionLoader<dop_algebra::Poly> {
        ExpressionLoader::new(&PolyAlgebra::new("t", "D").unwrap())
    }

    #[test]
    fn strips_continuations_and_line_endings() {
        let text = read_expression("t^2*D \\\r\n+ 3\\\n\n".as_bytes()).unwrap();
        assert_eq!(text, "t^2*D + 3");
    }

    #[test]
    fn continuation_lines_match_the_single_line_form() {
        let loader = loader();
        let split = loader.load("(t^2 + 1)*D^2 \\\n- 3*t*D \\\n+ 1/2\n".as_bytes()).unwrap();
        let single = loader.parse("(t^2 + 1)*D^2 - 3*t*D + 1/2").unwrap();
        assert_eq!(split, single);
    }

    #[test]
    fn malformed_input_carries_an_excerpt() {
        let err = loader().parse("0123456789abcdefghij + ) + 1").unwrap_err();
        let StoreError::MalformedExpression {
            offset, excerpt, ..
        } = err
        else {
            panic!("expected a malformed expression");
        };
        assert!(offset >= 10);
        assert!(excerpt.chars().count() <= 2 * EXCERPT_RADIUS);
    }

    #[test]
    fn evaluation_errors_point_at_the_offending_symbol() {
        let err = loader().parse("t*D + x^2").unwrap_err();
        let StoreError::MalformedExpression {
            offset,
            excerpt,
            reason,
        } = err
        else {
            panic!("expected a malformed expression");
        };
        assert_eq!(offset, 6);
        assert_eq!(excerpt, "t*D + x^2");
        assert_eq!(reason, "unknown symbol 'x'");
    }

    #[test]
    fn excerpt_window_counts_characters() {
        assert_eq!(excerpt("abcdefghijklmnopqrstuvwxyz", 13), "defghijklmnopqrstuvw");
        assert_eq!(excerpt("ä + ö", 2), "ä + ö");
    }
}
