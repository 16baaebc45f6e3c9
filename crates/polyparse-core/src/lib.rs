//! # Polyparse Core
//!
//! Parser combinators that keep every decomposition of their input.
//!
//! Most combinator libraries commit to the first alternative that succeeds.
//! Polyparse instead returns every valid way a grammar can match a prefix of
//! a line, which makes ambiguity visible and lets grammars be written without
//! worrying about alternative order. Alternation memoizes its results per
//! line and guards against re-entering itself, so left- and mutually
//! recursive rules terminate.
//!
//! ## Quick Start
//!
//! ```rust
//! use polyparse_core::{full_match, literal};
//!
//! // "ab" can be read as one token or as two
//! let token = literal("a").unwrap() | literal("b").unwrap() | literal("ab").unwrap();
//! let pair = token.clone() + token;
//!
//! // a|b, ab|a and ab|ab all match a prefix of "abab"
//! let variants = pair.parse_all("abab").unwrap();
//! assert_eq!(variants.len(), 3);
//!
//! // only ab|ab covers all of it
//! let variants = full_match(pair).parse_all("abab").unwrap();
//! assert_eq!(variants.len(), 1);
//! ```
//!
//! ## Recursive Grammars
//!
//! Build the alternation first, then late-bind the alternatives that refer
//! back to it:
//!
//! ```rust
//! use polyparse_core::{ch, full_match, Alternation, Grammar};
//!
//! // X := 'a' | X 'b'
//! let x = Grammar::new(Alternation::new([ch('a')]));
//! x.add_alternative(x.clone() + ch('b')).unwrap();
//!
//! let variants = full_match(x).parse_all("abbb").unwrap();
//! assert_eq!(variants.len(), 1);
//! ```
//!
//! ## Errors
//!
//! A failed parse ends its variant stream with a single [`ParseError`].
//! Invalid grammar construction is reported as a [`BuildError`].

pub mod alternation;
pub mod combinator;
pub mod error;
pub mod full_match;
pub mod line;
pub mod literal;
pub mod parser;
pub mod sequence;
pub mod variant;

pub use alternation::Alternation;
pub use combinator::{named, Named};
pub use error::{BuildError, ParseError, ParseErrorKind, ParseErrors, ParseResult};
pub use full_match::{full_match, FullMatch};
pub use line::{Line, Lines};
pub use literal::{ch, empty, literal, Empty, Literal};
pub use parser::{Grammar, Parser, ParserKind};
pub use sequence::{sequence, Sequence};
pub use variant::{ParseVariant, Variants};
