//! Parse results.

use crate::error::ParseResult;
use crate::line::Line;
use crate::parser::Grammar;

/// One successful way of matching a prefix of a line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseVariant {
    /// The parser state describing what matched.
    pub state: Grammar,
    /// The unconsumed suffix of the input.
    pub remainder: Line,
}

impl ParseVariant {
    #[inline]
    pub fn new(state: Grammar, remainder: Line) -> Self {
        Self { state, remainder }
    }

    /// Check if the match consumed the whole input.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.remainder.is_empty()
    }
}

/// A lazy stream of variants.
///
/// The stream yields `Ok` variants. If, and only if, it produced none, it
/// ends with a single `Err` describing why. `collect::<ParseResult<Vec<_>>>()`
/// therefore gives either every variant or the failure.
pub type Variants = Box<dyn Iterator<Item = ParseResult<ParseVariant>>>;
