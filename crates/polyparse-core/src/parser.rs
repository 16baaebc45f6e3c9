//! The parser capability and the shared [`Grammar`] handle.
//!
//! Every combinator kind is one concrete type implementing [`Parser`].
//! Grammars are trees (or, for recursive rules, graphs) of `Rc`-shared
//! nodes held through [`Grammar`], which adds structural equality, hashing
//! and the operator sugar used to write grammars:
//!
//! ```rust
//! use polyparse_core::literal;
//!
//! let greeting = literal("hi").unwrap() | literal("hello").unwrap();
//! let variants = greeting.parse_all("hello").unwrap();
//! assert_eq!(variants.len(), 1);
//! assert!(variants[0].remainder.is_empty());
//! ```
//!
//! Nodes use interior mutability for their caches, so a grammar is neither
//! `Send` nor `Sync`. Share a grammar between threads by building one per
//! thread.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, BitOr};
use std::rc::Rc;

use crate::alternation::Alternation;
use crate::combinator::Named;
use crate::error::{BuildError, ParseResult};
use crate::line::Line;
use crate::sequence::sequence;
use crate::variant::{ParseVariant, Variants};

/// The kinds of node a grammar is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Literal,
    Empty,
    Sequence,
    Alternation,
    FullMatch,
    Named,
}

/// Capability shared by every combinator.
pub trait Parser: fmt::Display + 'static {
    /// Produce every way this parser matches a prefix of `line`.
    fn parse(self: Rc<Self>, line: Line) -> Variants;

    fn kind(&self) -> ParserKind;

    /// Direct sub-parsers, in order.
    fn children(&self) -> Vec<Grammar> {
        Vec::new()
    }

    /// Structural equality against another node.
    fn same_as(&self, other: &dyn Parser) -> bool;

    /// Structural hash, consistent with [`Parser::same_as`].
    fn hash_into(&self, state: &mut dyn Hasher);

    /// Drop memoized results. Stateless parsers have nothing to drop.
    fn clear_cache(&self) {}

    /// Append the characters this node covers when used as a match state.
    fn write_text(&self, out: &mut String) {
        for child in self.children() {
            child.node().write_text(out);
        }
    }

    fn as_any(&self) -> &dyn Any;
}

/// A shared handle to a parser node.
#[derive(Clone)]
pub struct Grammar(Rc<dyn Parser>);

impl Grammar {
    /// Wrap a parser node.
    pub fn new<P: Parser>(parser: P) -> Self {
        Grammar(Rc::new(parser))
    }

    /// Wrap an already shared parser node, keeping its identity.
    pub fn from_rc<P: Parser>(parser: Rc<P>) -> Self {
        Grammar(parser)
    }

    /// The underlying node.
    #[inline]
    pub fn node(&self) -> &dyn Parser {
        &*self.0
    }

    /// Lazily produce every way this grammar matches a prefix of `line`.
    pub fn parse(&self, line: impl Into<Line>) -> Variants {
        Rc::clone(&self.0).parse(line.into())
    }

    /// Run [`Grammar::parse`] to completion.
    pub fn parse_all(&self, line: impl Into<Line>) -> ParseResult<Vec<ParseVariant>> {
        self.parse(line).collect()
    }

    #[inline]
    pub fn kind(&self) -> ParserKind {
        self.0.kind()
    }

    #[inline]
    pub fn children(&self) -> Vec<Grammar> {
        self.0.children()
    }

    /// Drop memoized results in this node and everything below it.
    pub fn clear_cache(&self) {
        self.0.clear_cache();
    }

    /// Check if both handles point at the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &Grammar) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    pub fn downcast_ref<T: Parser>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn as_alternation(&self) -> Option<&Alternation> {
        self.downcast_ref::<Alternation>()
    }

    /// Late-bind another alternative onto an alternation node.
    ///
    /// This is how recursive rules are written: build the alternation
    /// first, then add the alternatives that refer back to it.
    pub fn add_alternative(&self, alternative: Grammar) -> Result<(), BuildError> {
        match self.as_alternation() {
            Some(node) => {
                node.add_alternative(alternative);
                Ok(())
            }
            None => Err(BuildError::NotAlternation { kind: self.kind() }),
        }
    }

    /// Named children of this node, by key.
    ///
    /// Later children win when a key is used twice.
    pub fn key_args(&self) -> BTreeMap<String, Grammar> {
        self.children()
            .iter()
            .filter_map(|child| child.downcast_ref::<Named>())
            .map(|named| (named.key().to_string(), named.inner().clone()))
            .collect()
    }

    /// Every named capture in this state, in match order.
    pub fn captures(&self) -> Vec<(String, Grammar)> {
        let mut out = Vec::new();
        self.collect_captures(&mut out);
        out
    }

    fn collect_captures(&self, out: &mut Vec<(String, Grammar)>) {
        if let Some(named) = self.downcast_ref::<Named>() {
            out.push((named.key().to_string(), named.inner().clone()));
            named.inner().collect_captures(out);
            return;
        }
        // Alternations never appear inside match states; skipping them also
        // keeps this walk finite on recursive grammars.
        if self.kind() == ParserKind::Alternation {
            return;
        }
        for child in self.children() {
            child.collect_captures(out);
        }
    }

    /// The text covered by this match state.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.0.write_text(&mut out);
        out
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.same_as(other.node())
    }
}

impl Eq for Grammar {}

impl Hash for Grammar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash_into(state);
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:?}: {}>", self.kind(), self.0)
    }
}

/// `+` for sequence: A + B matches A then B
impl Add for Grammar {
    type Output = Grammar;

    fn add(self, rhs: Grammar) -> Grammar {
        sequence([self, rhs])
    }
}

/// `|` for alternation: A | B matches A or B, keeping both when both match
impl BitOr for Grammar {
    type Output = Grammar;

    fn bitor(self, rhs: Grammar) -> Grammar {
        Grammar::new(Alternation::new([self, rhs]))
    }
}
