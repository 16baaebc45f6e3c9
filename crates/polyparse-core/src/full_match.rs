//! The full-consumption wrapper.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::ParseError;
use crate::line::Line;
use crate::parser::{Grammar, Parser, ParserKind};
use crate::variant::{ParseVariant, Variants};

/// Keeps only the matches of the wrapped parser that consume the whole line.
///
/// If the wrapped parser fails, its error is passed through unchanged. If it
/// matches but every match leaves trailing input, the stream ends with an
/// [`Incomplete`](crate::ParseErrorKind::Incomplete) error instead.
pub struct FullMatch {
    inner: Grammar,
}

impl FullMatch {
    pub fn new(inner: Grammar) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Grammar {
        &self.inner
    }
}

impl Parser for FullMatch {
    fn parse(self: Rc<Self>, line: Line) -> Variants {
        Box::new(Complete {
            inner: self.inner.parse(&line),
            line,
            found: false,
            done: false,
        })
    }

    fn kind(&self) -> ParserKind {
        ParserKind::FullMatch
    }

    fn children(&self) -> Vec<Grammar> {
        vec![self.inner.clone()]
    }

    fn same_as(&self, other: &dyn Parser) -> bool {
        other
            .as_any()
            .downcast_ref::<FullMatch>()
            .is_some_and(|other| other.inner == self.inner)
    }

    fn hash_into(&self, mut state: &mut dyn Hasher) {
        ParserKind::FullMatch.hash(&mut state);
        self.inner.hash(&mut state);
    }

    fn clear_cache(&self) {
        self.inner.clear_cache();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for FullMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "full({})", self.inner)
    }
}

/// Filtering stream behind [`FullMatch::parse`].
struct Complete {
    inner: Variants,
    line: Line,
    found: bool,
    done: bool,
}

impl Iterator for Complete {
    type Item = Result<ParseVariant, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for result in self.inner.by_ref() {
            match result {
                Ok(variant) if variant.is_complete() => {
                    self.found = true;
                    return Some(Ok(variant));
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        self.done = true;
        if self.found {
            None
        } else {
            Some(Err(ParseError::incomplete(&self.line)))
        }
    }
}

/// Require `inner` to match the whole line.
pub fn full_match(inner: Grammar) -> Grammar {
    Grammar::new(FullMatch::new(inner))
}
