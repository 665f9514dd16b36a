//! Operator keys and the templates that turn them into file names.

use std::{
    fmt,
    path::{Component, Path},
    str::FromStr,
};

use serde::{Serialize, Serializer};

use crate::StoreError;

/// Repository-defined identifier of an operator: an ordered list of fields.
///
/// A key has no meaning beyond naming. `Key::from((13, 3754))` has two
/// fields and formats `dop.{0}.{1}` as `dop.13.3754`; `Key::from("13.3754")`
/// has a single field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Vec<String>);

impl Key {
    #[must_use]
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn field(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for Key {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl<A: fmt::Display, B: fmt::Display> From<(A, B)> for Key {
    fn from((a, b): (A, B)) -> Self {
        Self(vec![a.to_string(), b.to_string()])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Field(usize),
}

/// A `str.format`-style file name template such as `dop.{0}.{1}`.
///
/// Supports positional fields (`{0}`), automatic numbering (`{}`) and the
/// `{{`/`}}` escapes. Format specs and conversions are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    pieces: Vec<Piece>,
}

impl NameTemplate {
    /// # Errors
    /// Returns [`StoreError::InvalidTemplate`] for unbalanced braces, named
    /// or formatted fields, or mixed manual and automatic numbering.
    pub fn parse(template: &str) -> Result<Self, StoreError> {
        let invalid = |reason: &str| StoreError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut auto_index = 0usize;
        let mut manual = false;
        let mut automatic = false;
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(invalid("single '}' encountered")),
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) if c.is_ascii_digit() => field.push(c),
                            Some(_) => return Err(invalid("only positional fields are supported")),
                            None => return Err(invalid("single '{' encountered")),
                        }
                    }
                    let index = if field.is_empty() {
                        automatic = true;
                        auto_index += 1;
                        auto_index - 1
                    } else {
                        manual = true;
                        field
                            .parse()
                            .map_err(|_| invalid("field index is too large"))?
                    };
                    if manual && automatic {
                        return Err(invalid(
                            "cannot mix automatic and manual field numbering",
                        ));
                    }
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Field(index));
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Self {
            source: template.to_string(),
            pieces,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of key fields the template needs.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.pieces
            .iter()
            .filter_map(|piece| match piece {
                Piece::Field(index) => Some(index + 1),
                Piece::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Formats `key` into a relative file name.
    ///
    /// Returns `None` when the key has too few fields or the result would
    /// escape the data directory (absolute paths, `..` components).
    #[must_use]
    pub fn render(&self, key: &Key) -> Option<String> {
        let mut name = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => name.push_str(text),
                Piece::Field(index) => name.push_str(key.field(*index)?),
            }
        }
        let stays_inside = !name.is_empty()
            && Path::new(&name)
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        stays_inside.then_some(name)
    }
}

impl FromStr for NameTemplate {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
