//! The alternation ("or") combinator.
//!
//! Alternation keeps every variant any alternative produces, and it is the
//! node recursive grammars are built around. Each instance memoizes, per
//! line, the variants found so far and whether a search of that line is in
//! flight:
//!
//! 1. Variants already memoized for the line are replayed first.
//! 2. If a search of the line is already running further up the call
//!    stack, the replay is all the caller gets. Self-reference therefore
//!    resolves through the memo instead of re-entering the search.
//! 3. Otherwise the search runs in rounds. Each round asks every
//!    alternative in turn and yields each variant not yet memoized the
//!    moment it is found. Rounds repeat until one adds nothing, which lets
//!    recursive alternatives see the results of earlier rounds and
//!    terminates whenever the set of reachable variants is finite.
//!
//! The in-flight flag is released when the search finishes or when the
//! stream is dropped part way, whichever comes first.
//!
//! A grammar like `X := 'a' | X 'b'` is built in two phases:
//!
//! ```rust
//! use polyparse_core::{ch, Alternation, Grammar};
//!
//! let x = Grammar::new(Alternation::new([ch('a')]));
//! x.add_alternative(x.clone() + ch('b')).unwrap();
//!
//! let full: Vec<_> = x
//!     .parse("ab")
//!     .filter_map(Result::ok)
//!     .filter(|v| v.is_complete())
//!     .collect();
//! assert_eq!(full.len(), 1);
//! ```
//!
//! A recursive rule holds a reference cycle and is never freed on its own.
//! Call [`Grammar::clear_cache`] once a long-lived grammar is done with an
//! input to release the memoized variants.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::combinator::{flatten, fmt_children, same_children};
use crate::error::{ParseError, ParseErrors};
use crate::line::Line;
use crate::parser::{Grammar, Parser, ParserKind};
use crate::variant::{ParseVariant, Variants};

/// Matches any of its alternatives, keeping every distinct variant.
pub struct Alternation {
    alternatives: RefCell<Vec<Grammar>>,
    /// Variants discovered so far, per line, in discovery order.
    memo: RefCell<HashMap<Line, Vec<ParseVariant>>>,
    /// Lines with a search in flight.
    searching: RefCell<HashSet<Line>>,
    /// Re-entrancy guards for walks that may cycle back to this node.
    clearing: Cell<bool>,
    printing: Cell<bool>,
    /// Nodes this one is being compared against, innermost last.
    comparing: RefCell<Vec<*const ()>>,
}

impl Alternation {
    /// Create an alternation, splicing nested alternations and dropping
    /// identity matchers.
    pub fn new<I>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = Grammar>,
    {
        Self {
            alternatives: RefCell::new(flatten(ParserKind::Alternation, alternatives)),
            memo: RefCell::new(HashMap::new()),
            searching: RefCell::new(HashSet::new()),
            clearing: Cell::new(false),
            printing: Cell::new(false),
            comparing: RefCell::new(Vec::new()),
        }
    }

    /// Snapshot of the current alternatives.
    pub fn alternatives(&self) -> Vec<Grammar> {
        self.alternatives.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.alternatives.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.borrow().is_empty()
    }

    /// Append an alternative in place.
    ///
    /// An alternation is spliced in as its alternatives. Every memo reachable
    /// from this node is invalidated, since earlier searches concluded
    /// without the new alternative.
    pub fn add_alternative(&self, alternative: Grammar) {
        let added = flatten(ParserKind::Alternation, [alternative]);
        self.alternatives.borrow_mut().extend(added);
        self.clear_cache();
    }

    /// Number of variants memoized for `line`.
    pub fn cached_variants(&self, line: &Line) -> usize {
        self.memo.borrow().get(line).map_or(0, Vec::len)
    }

    /// Try each alternative once, in declaration order.
    ///
    /// Duplicate variants are dropped and the errors of failing
    /// alternatives are kept as detail on the returned error. Nothing is
    /// memoized and nothing guards against recursion: a grammar that
    /// reaches this node again on the same line recurses without bound. Use
    /// it only on non-recursive grammars.
    pub fn parse_direct(&self, line: impl Into<Line>) -> Result<Vec<ParseVariant>, ParseError> {
        let line = line.into();
        let mut found: Vec<ParseVariant> = Vec::new();
        let mut errors = ParseErrors::new();

        for alternative in self.alternatives() {
            for result in alternative.parse(&line) {
                match result {
                    Ok(variant) => {
                        if !found.contains(&variant) {
                            found.push(variant);
                        }
                    }
                    Err(e) => errors.push(e),
                }
            }
        }

        if found.is_empty() {
            Err(ParseError::alternation(&line).with_steps(vec![errors]))
        } else {
            Ok(found)
        }
    }

    fn replay(&self, line: &Line, index: usize) -> Option<ParseVariant> {
        let memo = self.memo.borrow();
        let variant = memo.get(line)?.get(index)?;
        Some(ParseVariant::new(
            variant.state.clone(),
            line.rebase(&variant.remainder),
        ))
    }

    fn memo_len(&self, line: &Line) -> usize {
        self.cached_variants(line)
    }

    /// Memoize `variant` unless an equal one is already known.
    fn remember(&self, line: &Line, variant: &ParseVariant) -> bool {
        let mut memo = self.memo.borrow_mut();
        let known = memo.entry(line.clone()).or_default();
        if known.contains(variant) {
            false
        } else {
            known.push(variant.clone());
            true
        }
    }

    fn is_searching(&self, line: &Line) -> bool {
        self.searching.borrow().contains(line)
    }

    fn begin_search(&self, line: &Line) {
        self.searching.borrow_mut().insert(line.clone());
    }

    fn end_search(&self, line: &Line) {
        self.searching.borrow_mut().remove(line);
    }
}

impl Parser for Alternation {
    fn parse(self: Rc<Self>, line: Line) -> Variants {
        Box::new(Search::new(self, line))
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Alternation
    }

    fn children(&self) -> Vec<Grammar> {
        self.alternatives()
    }

    fn same_as(&self, other: &dyn Parser) -> bool {
        // Meeting the same pair again while comparing means the cycle
        // matched so far.
        let other_addr = other as *const _ as *const ();
        if self.comparing.borrow().contains(&other_addr) {
            return true;
        }

        self.comparing.borrow_mut().push(other_addr);
        let same = same_children(ParserKind::Alternation, &self.alternatives(), other);
        self.comparing.borrow_mut().pop();
        same
    }

    fn hash_into(&self, mut state: &mut dyn Hasher) {
        // Children are not hashed: they may lead back here.
        ParserKind::Alternation.hash(&mut state);
        self.len().hash(&mut state);
    }

    fn clear_cache(&self) {
        if self.clearing.replace(true) {
            return;
        }

        debug!(alternatives = self.len(), "clearing alternation cache");
        self.memo.borrow_mut().clear();
        self.searching.borrow_mut().clear();

        for alternative in self.alternatives() {
            alternative.clear_cache();
        }

        self.clearing.set(false);
    }

    fn write_text(&self, _out: &mut String) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for Alternation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.printing.replace(true) {
            return f.write_str("<recursive>");
        }
        let result = fmt_children(f, &self.alternatives(), "|");
        self.printing.set(false);
        result
    }
}

enum Stage {
    Replay,
    Search,
    Finished,
}

/// One lazy evaluation of an alternation against one line.
struct Search {
    node: Rc<Alternation>,
    line: Line,
    stage: Stage,
    /// Next memo index to replay.
    replayed: usize,
    /// Whether this evaluation owns the in-flight flag for `line`.
    holds_flag: bool,
    yielded: bool,
    round: usize,
    round_start: usize,
    pending: Vec<Grammar>,
    current: Option<Variants>,
}

impl Search {
    fn new(node: Rc<Alternation>, line: Line) -> Self {
        Self {
            node,
            line,
            stage: Stage::Replay,
            replayed: 0,
            holds_flag: false,
            yielded: false,
            round: 0,
            round_start: 0,
            pending: Vec::new(),
            current: None,
        }
    }

    fn start_round(&mut self) {
        self.round += 1;
        self.round_start = self.node.memo_len(&self.line);
        let mut pending = self.node.alternatives();
        pending.reverse();
        self.pending = pending;
        trace!(
            offset = self.line.offset(),
            round = self.round,
            known = self.round_start,
            "alternation round"
        );
    }

    fn release(&mut self) {
        if self.holds_flag {
            self.node.end_search(&self.line);
            self.holds_flag = false;
        }
        self.current = None;
        self.pending.clear();
    }

    fn finish(&mut self) -> Option<Result<ParseVariant, ParseError>> {
        self.release();
        self.stage = Stage::Finished;
        if self.yielded {
            None
        } else {
            Some(Err(ParseError::alternation(&self.line)))
        }
    }
}

impl Iterator for Search {
    type Item = Result<ParseVariant, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stage {
                Stage::Replay => {
                    if let Some(variant) = self.node.replay(&self.line, self.replayed) {
                        self.replayed += 1;
                        self.yielded = true;
                        return Some(Ok(variant));
                    }
                    if self.node.is_searching(&self.line) {
                        return self.finish();
                    }
                    self.node.begin_search(&self.line);
                    self.holds_flag = true;
                    self.stage = Stage::Search;
                    self.start_round();
                }
                Stage::Search => {
                    if let Some(current) = self.current.as_mut() {
                        match current.next() {
                            Some(Ok(variant)) => {
                                if self.node.remember(&self.line, &variant) {
                                    self.yielded = true;
                                    return Some(Ok(variant));
                                }
                            }
                            // A failing alternative does not fail the round
                            Some(Err(_)) => self.current = None,
                            None => self.current = None,
                        }
                        continue;
                    }

                    if let Some(alternative) = self.pending.pop() {
                        self.current = Some(alternative.parse(&self.line));
                        continue;
                    }

                    if self.node.memo_len(&self.line) == self.round_start {
                        return self.finish();
                    }
                    self.start_round();
                }
                Stage::Finished => return None,
            }
        }
    }
}

impl Drop for Search {
    fn drop(&mut self) {
        self.release();
    }
}
