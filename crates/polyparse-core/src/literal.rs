//! Terminal parsers.
//!
//! [`Literal`] matches exactly one character and is the only parser that
//! consumes input. Longer literals are sequences of single-character
//! literals, built with [`literal`]. [`Empty`] matches without consuming
//! anything and is dropped from every combinator it is passed to.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter;
use std::rc::Rc;

use crate::error::{BuildError, ParseError};
use crate::line::Line;
use crate::parser::{Grammar, Parser, ParserKind};
use crate::sequence::sequence;
use crate::variant::{ParseVariant, Variants};

/// Matches a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    ch: char,
}

impl Literal {
    /// Create a literal from a one-character string.
    pub fn new(text: &str) -> Result<Self, BuildError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(Self { ch }),
            _ => Err(BuildError::LiteralLength {
                text: text.to_string(),
                len: text.chars().count(),
            }),
        }
    }

    #[inline]
    pub fn ch(&self) -> char {
        self.ch
    }
}

impl From<char> for Literal {
    fn from(ch: char) -> Self {
        Self { ch }
    }
}

impl Parser for Literal {
    fn parse(self: Rc<Self>, line: Line) -> Variants {
        let result = if line.starts_with(self.ch) {
            let rest = line.skip(1);
            Ok(ParseVariant::new(Grammar::from_rc(self), rest))
        } else {
            Err(ParseError::mismatch(self.ch, &line))
        };
        Box::new(iter::once(result))
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Literal
    }

    fn same_as(&self, other: &dyn Parser) -> bool {
        other
            .as_any()
            .downcast_ref::<Literal>()
            .is_some_and(|other| other.ch == self.ch)
    }

    fn hash_into(&self, mut state: &mut dyn Hasher) {
        ParserKind::Literal.hash(&mut state);
        self.ch.hash(&mut state);
    }

    fn write_text(&self, out: &mut String) {
        out.push(self.ch);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.ch)
    }
}

/// The zero-width identity matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Empty;

impl Parser for Empty {
    fn parse(self: Rc<Self>, line: Line) -> Variants {
        Box::new(iter::once(Ok(ParseVariant::new(
            Grammar::from_rc(self),
            line,
        ))))
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Empty
    }

    fn same_as(&self, other: &dyn Parser) -> bool {
        other.kind() == ParserKind::Empty
    }

    fn hash_into(&self, mut state: &mut dyn Hasher) {
        ParserKind::Empty.hash(&mut state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for Empty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ε")
    }
}

/// Match a single character.
pub fn ch(ch: char) -> Grammar {
    Grammar::new(Literal::from(ch))
}

/// Match `text` character by character.
///
/// A one-character string gives a single [`Literal`]; longer strings give
/// a sequence with one literal per character.
pub fn literal(text: &str) -> Result<Grammar, BuildError> {
    let mut chars = text.chars().peekable();
    let first = chars.next().ok_or(BuildError::EmptyLiteral)?;
    if chars.peek().is_none() {
        return Ok(self::ch(first));
    }
    Ok(sequence(text.chars().map(self::ch)))
}

/// The zero-width identity matcher as a grammar.
pub fn empty() -> Grammar {
    Grammar::new(Empty)
}
