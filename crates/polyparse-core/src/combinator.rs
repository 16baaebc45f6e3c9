//! Shared machinery for n-ary combinators, and the named-capture marker.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::line::Line;
use crate::parser::{Grammar, Parser, ParserKind};
use crate::variant::{ParseVariant, Variants};

/// Normalize the children of an n-ary combinator of `kind`.
///
/// Children that are themselves `kind` combinators are spliced in place, so
/// nesting never changes the shape of a combinator, and identity matchers
/// are dropped.
pub(crate) fn flatten<I>(kind: ParserKind, children: I) -> Vec<Grammar>
where
    I: IntoIterator<Item = Grammar>,
{
    let mut out = Vec::new();
    for child in children {
        if child.kind() == kind {
            out.extend(child.children());
        } else if child.kind() != ParserKind::Empty {
            out.push(child);
        }
    }
    out
}

/// Ordered child equality against another node of the same kind.
pub(crate) fn same_children(kind: ParserKind, children: &[Grammar], other: &dyn Parser) -> bool {
    other.kind() == kind && children == other.children().as_slice()
}

/// Join children for display, e.g. `(a & b & c)`.
pub(crate) fn fmt_children(
    f: &mut fmt::Formatter<'_>,
    children: &[Grammar],
    symbol: &str,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", symbol)?;
        }
        write!(f, "{}", child)?;
    }
    f.write_str(")")
}

/// Tags a sub-parser with a key for labeled extraction.
///
/// Parses exactly like the wrapped parser; every state it yields is wrapped
/// again, so the key survives into match results.
pub struct Named {
    key: String,
    inner: Grammar,
}

impl Named {
    pub fn new(key: impl Into<String>, inner: Grammar) -> Self {
        Self {
            key: key.into(),
            inner,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn inner(&self) -> &Grammar {
        &self.inner
    }
}

impl Parser for Named {
    fn parse(self: Rc<Self>, line: Line) -> Variants {
        let key = self.key.clone();
        Box::new(self.inner.parse(line).map(move |result| {
            result.map(|variant| {
                let state = Grammar::new(Named::new(key.clone(), variant.state));
                ParseVariant::new(state, variant.remainder)
            })
        }))
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Named
    }

    fn children(&self) -> Vec<Grammar> {
        vec![self.inner.clone()]
    }

    fn same_as(&self, other: &dyn Parser) -> bool {
        other
            .as_any()
            .downcast_ref::<Named>()
            .is_some_and(|other| other.key == self.key && other.inner == self.inner)
    }

    fn hash_into(&self, mut state: &mut dyn Hasher) {
        ParserKind::Named.hash(&mut state);
        self.key.hash(&mut state);
        self.inner.hash(&mut state);
    }

    fn clear_cache(&self) {
        self.inner.clear_cache();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for Named {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.inner)
    }
}

/// Tag `inner` with `key`.
pub fn named(key: impl Into<String>, inner: Grammar) -> Grammar {
    Grammar::new(Named::new(key, inner))
}
