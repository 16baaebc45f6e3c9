//! The sequence ("and") combinator.
//!
//! Children match left to right, each one against the remainder the
//! previous one left. Because every child may be ambiguous, each step
//! expands every surviving variant by every variant the next child yields
//! on its remainder. A continuation that fails is dropped on its own; its
//! siblings carry on.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::combinator::{flatten, fmt_children, same_children};
use crate::error::{BuildError, ParseError, ParseErrors, ParseResult};
use crate::literal::Empty;
use crate::line::Line;
use crate::parser::{Grammar, Parser, ParserKind};
use crate::variant::{ParseVariant, Variants};

/// Matches its children one after another.
pub struct Sequence {
    children: Vec<Grammar>,
}

impl Sequence {
    /// Create a sequence, splicing nested sequences and dropping identity
    /// matchers.
    ///
    /// Fails with [`BuildError::EmptySequence`] when nothing is left to
    /// match. [`sequence`] collapses that case to the identity matcher
    /// instead.
    pub fn new<I>(children: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Grammar>,
    {
        let children = flatten(ParserKind::Sequence, children);
        if children.is_empty() {
            return Err(BuildError::EmptySequence);
        }
        Ok(Self { children })
    }

    pub fn children(&self) -> &[Grammar] {
        &self.children
    }

    fn expand(&self, line: &Line) -> ParseResult<Vec<ParseVariant>> {
        let mut variants: Vec<ParseVariant> = Vec::new();
        let mut steps: Vec<ParseErrors> = Vec::with_capacity(self.children.len());

        for (i, child) in self.children.iter().enumerate() {
            let mut errors = ParseErrors::new();

            if i == 0 {
                match child.parse_all(line) {
                    Ok(first) => variants = first,
                    Err(e) => errors.push(e),
                }
            } else {
                let mut next = Vec::with_capacity(variants.len());
                for variant in &variants {
                    match child.parse_all(&variant.remainder) {
                        Ok(continuations) => {
                            next.extend(continuations.into_iter().map(|sub| {
                                ParseVariant::new(
                                    sequence([variant.state.clone(), sub.state]),
                                    sub.remainder,
                                )
                            }));
                        }
                        Err(e) => errors.push(e),
                    }
                }
                variants = next;
            }

            steps.push(errors);

            // Nothing left to continue from
            if variants.is_empty() {
                break;
            }
        }

        if variants.is_empty() {
            Err(ParseError::sequence(steps, line))
        } else {
            Ok(variants)
        }
    }
}

impl Parser for Sequence {
    fn parse(self: Rc<Self>, line: Line) -> Variants {
        match self.expand(&line) {
            Ok(variants) => Box::new(variants.into_iter().map(Ok)),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Sequence
    }

    fn children(&self) -> Vec<Grammar> {
        self.children.clone()
    }

    fn same_as(&self, other: &dyn Parser) -> bool {
        same_children(ParserKind::Sequence, &self.children, other)
    }

    fn hash_into(&self, mut state: &mut dyn Hasher) {
        ParserKind::Sequence.hash(&mut state);
        self.children.hash(&mut state);
    }

    fn clear_cache(&self) {
        for child in &self.children {
            child.clear_cache();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_children(f, &self.children, "&")
    }
}

/// Match `children` in order.
///
/// After flattening, no children gives the identity matcher and a single
/// child is returned as is.
pub fn sequence<I>(children: I) -> Grammar
where
    I: IntoIterator<Item = Grammar>,
{
    let mut children = flatten(ParserKind::Sequence, children);
    match children.len() {
        0 => Grammar::new(Empty),
        1 => children.remove(0),
        _ => Grammar::new(Sequence { children }),
    }
}
