//! Error types for grammar construction and parsing.
//!
//! Parse failures are ordinary control flow: combinators swallow the
//! failures of their children and only report their own error once every
//! possibility is exhausted. Construction failures are [`BuildError`]s and
//! are never recovered by the engine.

use thiserror::Error;

use crate::line::Line;
use crate::parser::ParserKind;

/// Error kinds for categorizing parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A terminal did not match at this position
    Mismatch,
    /// No sequential match survived; see the per-step detail
    Sequence,
    /// No alternative matched
    Alternation,
    /// Matches existed but none consumed the whole line
    Incomplete,
}

/// A parse failure with location and nested diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {offset}")]
pub struct ParseError {
    /// Human-readable error message
    pub message: String,
    /// Error categorization
    pub kind: ParseErrorKind,
    /// Byte offset of the line the failing node was asked to match
    pub offset: usize,
    /// Nested failures, one collection per step (sequences) or a single
    /// collection of swallowed child errors (direct alternation)
    pub steps: Vec<ParseErrors>,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, kind: ParseErrorKind, line: &Line) -> Self {
        Self {
            message: message.into(),
            kind,
            offset: line.offset(),
            steps: Vec::new(),
        }
    }

    /// Create an error for a terminal that did not match.
    pub fn mismatch(expected: char, line: &Line) -> Self {
        let message = match line.first() {
            Some(found) => format!("expected {:?}, found {:?}", expected, found),
            None => format!("expected {:?}, found end of line", expected),
        };
        Self::new(message, ParseErrorKind::Mismatch, line)
    }

    /// Create an error for a sequence with no surviving variant.
    pub fn sequence(steps: Vec<ParseErrors>, line: &Line) -> Self {
        Self::new("no sequential match", ParseErrorKind::Sequence, line).with_steps(steps)
    }

    /// Create an error for an alternation where nothing matched.
    pub fn alternation(line: &Line) -> Self {
        Self::new("no alternative matched", ParseErrorKind::Alternation, line)
    }

    /// Create an error for matches that left trailing input.
    pub fn incomplete(line: &Line) -> Self {
        Self::new(
            "no match consumed the whole line",
            ParseErrorKind::Incomplete,
            line,
        )
    }

    /// Attach nested error detail.
    pub fn with_steps(mut self, steps: Vec<ParseErrors>) -> Self {
        self.steps = steps;
        self
    }

    /// Furthest byte offset reached by this error or any nested error.
    pub fn deepest_offset(&self) -> usize {
        self.steps
            .iter()
            .flat_map(ParseErrors::iter)
            .map(ParseError::deepest_offset)
            .fold(self.offset, usize::max)
    }
}

/// A collection of parse errors gathered at one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    /// Create an empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if any errors were collected.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl FromIterator<ParseError> for ParseErrors {
    fn from_iter<I: IntoIterator<Item = ParseError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Invalid combinator configuration, raised while building a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A single-character terminal was given some other number of characters.
    #[error("literal must be exactly one character, not {len} {text:?}")]
    LiteralLength { text: String, len: usize },
    /// A string literal factory was given nothing to match.
    #[error("literal must contain at least one character")]
    EmptyLiteral,
    /// A sequence node was built with no children left after flattening.
    #[error("sequence must have at least one child")]
    EmptySequence,
    /// Alternatives can only be late-bound onto alternation nodes.
    #[error("cannot add an alternative to a {kind:?} node")]
    NotAlternation { kind: ParserKind },
}

/// Result of a single parse step.
pub type ParseResult<T> = Result<T, ParseError>;
