//! Input lines for the combinator engine.
//!
//! A [`Line`] is the unconsumed suffix of some input text. Parsers never
//! mutate a line; consuming characters produces a new, shorter `Line` that
//! shares the same buffer.
//!
//! # Performance
//!
//! - Zero-copy: slicing only moves a byte offset into a shared `Rc<str>`
//! - Newline scanning in [`Lines`] is SIMD-accelerated via `memchr`
//! - Equality and hashing look at the unconsumed text only, so lines cut from
//!   different buffers still hit the same alternation cache entries

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use memchr::memchr;

/// The unconsumed remainder of an input text.
#[derive(Clone)]
pub struct Line {
    /// The complete buffer this line was cut from.
    source: Rc<str>,
    /// Byte offset of the first unconsumed character.
    start: usize,
}

impl Line {
    /// Create a line covering all of `text`.
    #[inline]
    pub fn new(text: impl Into<Rc<str>>) -> Self {
        Self {
            source: text.into(),
            start: 0,
        }
    }

    /// The unconsumed text.
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        // `start` only ever lands on char boundaries (see `skip` and `rebase`).
        &self.source[self.start..]
    }

    /// Check if every character has been consumed.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.start >= self.source.len()
    }

    /// Length of the unconsumed text in bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.source.len() - self.start
    }

    /// Byte offset of the unconsumed text within its buffer.
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.start
    }

    /// The next unconsumed character, if any.
    #[inline]
    pub fn first(&self) -> Option<char> {
        self.as_str().chars().next()
    }

    /// Check if the unconsumed text starts with `ch`.
    #[inline]
    pub fn starts_with(&self, ch: char) -> bool {
        self.first() == Some(ch)
    }

    /// Drop the first `n` characters.
    ///
    /// Skipping past the end yields an empty line rather than failing.
    pub fn skip(&self, n: usize) -> Line {
        let consumed = match self.as_str().char_indices().nth(n) {
            Some((idx, _)) => idx,
            None => self.len(),
        };
        Line {
            source: Rc::clone(&self.source),
            start: self.start + consumed,
        }
    }

    /// Re-anchor `remainder` onto this line's buffer.
    ///
    /// `remainder` must be textually equal to a suffix of `self`; the result
    /// is that same suffix cut from `self`'s buffer.
    pub(crate) fn rebase(&self, remainder: &Line) -> Line {
        debug_assert!(self.as_str().ends_with(remainder.as_str()));
        Line {
            source: Rc::clone(&self.source),
            start: self.source.len() - remainder.len(),
        }
    }
}

impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Line {}

impl PartialEq<str> for Line {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Line {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Hash for Line {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?} @{})", self.as_str(), self.start)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Line::new(text)
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Line::new(text)
    }
}

impl From<&Line> for Line {
    fn from(line: &Line) -> Self {
        line.clone()
    }
}

/// Splits a block of text into one [`Line`] per text line.
///
/// Line terminators are not part of the yielded lines; `\r\n` is treated
/// the same as `\n`. A trailing newline does not produce an empty final line.
pub struct Lines<'a> {
    /// Input as bytes for efficient scanning.
    bytes: &'a [u8],
    /// The complete input text.
    input: &'a str,
    /// Current byte offset.
    offset: usize,
}

impl<'a> Lines<'a> {
    /// Create a line splitter over `input`.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            input,
            offset: 0,
        }
    }
}

impl Iterator for Lines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if self.offset >= self.bytes.len() {
            return None;
        }

        let start = self.offset;

        let end = match memchr(b'\n', &self.bytes[start..]) {
            Some(pos) => start + pos,
            None => self.bytes.len(),
        };

        // CRLF: drop the carriage return as well
        let text_end = if end > start && self.bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };

        self.offset = if end < self.bytes.len() { end + 1 } else { end };

        // `\n` and `\r` are ASCII, so both cut points are char boundaries.
        Some(Line::new(&self.input[start..text_end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_saturates_at_end() {
        let line = Line::new("ab");
        assert_eq!(line.skip(1), "b");
        assert_eq!(line.skip(1).offset(), 1);
        assert!(line.skip(5).is_empty());
    }

    #[test]
    fn skip_counts_characters_not_bytes() {
        let line = Line::new("éa");
        assert_eq!(line.skip(1), "a");
        assert_eq!(line.skip(1).offset(), 2);
    }

    #[test]
    fn equality_ignores_backing_buffer() {
        let a = Line::new("xyz").skip(1);
        let b = Line::new("yz");
        assert_eq!(a, b);
        assert_ne!(a.offset(), b.offset());
    }

    #[test]
    fn rebase_moves_remainder_onto_caller_buffer() {
        let cached = Line::new("yz").skip(1);
        let caller = Line::new("xyz").skip(1);
        let rebased = caller.rebase(&cached);
        assert_eq!(rebased, "z");
        assert_eq!(rebased.offset(), 2);
    }

    #[test]
    fn lines_handle_crlf_and_trailing_newline() {
        let lines: Vec<Line> = Lines::new("ab\r\ncd\n\nef\n").collect();
        assert_eq!(lines, vec!["ab", "cd", "", "ef"]);
    }
}
