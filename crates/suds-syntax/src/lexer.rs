#![forbid(unsafe_code)]

//! The SUDS tokenizer.
//!
//! [`tokenize`] returns a lazy [`Tokens`] iterator. Each call owns its cursor
//! and state stack; the only shared data is the immutable rule table, so any
//! number of tokenizations may run on separate threads.
//!
//! Emitted tokens are non-empty, ordered, and partition the input: joining
//! their text reproduces the source byte for byte.

use smallvec::SmallVec;

use crate::rules::{Action, Captures, LexState, Rule, RuleTable, Transition};
use crate::token::{Token, TokenKind};
use crate::validate::covers_source;

// ---------------------------------------------------------------------------
// Lexer metadata
// ---------------------------------------------------------------------------

/// Static description of the SUDS lexer for hosts that pick lexers by name
/// or file pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct SudsLexer;

impl SudsLexer {
    pub const NAME: &'static str = "SUDS";
    pub const ALIASES: &'static [&'static str] = &["suds"];
    pub const FILENAMES: &'static [&'static str] = &["*.sud"];

    /// Tokenize `source` with the standard rule table.
    pub fn tokenize(self, source: &str) -> Tokens<'_> {
        tokenize(source)
    }
}

/// Tokenize `source` with the standard rule table.
pub fn tokenize(source: &str) -> Tokens<'_> {
    Tokens::new(RuleTable::standard(), source)
}

/// Tokenize `source` and collect every token.
pub fn tokenize_to_vec(source: &str) -> Vec<Token> {
    let tokens: Vec<Token> = tokenize(source).collect();
    debug_assert!(covers_source(source, &tokens), "tokens do not partition the source");
    tokens
}

// ---------------------------------------------------------------------------
// Tokens iterator
// ---------------------------------------------------------------------------

/// Counters describing one tokenization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexStats {
    /// Scan steps taken (one per rule match or recovery).
    pub steps: usize,
    /// Characters consumed because no rule of the active state matched.
    pub recoveries: usize,
    pub pushes: usize,
    pub pops: usize,
}

/// Lazy token stream over one source string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    table: &'a RuleTable,
    source: &'a str,
    cursor: usize,
    stack: SmallVec<[LexState; 4]>,
    /// Tokens of the current match not yet handed out, in reverse order.
    pending: SmallVec<[Token; 8]>,
    stats: LexStats,
    finished: bool,
}

impl<'a> Tokens<'a> {
    /// Start tokenizing `source` with `table`.
    pub fn new(table: &'a RuleTable, source: &'a str) -> Self {
        let mut stack = SmallVec::new();
        stack.push(LexState::Default);
        Self {
            table,
            source,
            cursor: 0,
            stack,
            pending: SmallVec::new(),
            stats: LexStats::default(),
            finished: false,
        }
    }

    /// The state on top of the stack.
    pub fn state(&self) -> LexState {
        self.stack.last().copied().unwrap_or_default()
    }

    /// Depth of the state stack (at least 1).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Byte offset of the next unscanned character.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    pub fn stats(&self) -> LexStats {
        self.stats
    }

    fn step(&mut self) {
        self.stats.steps += 1;
        let state = self.state();
        match self.table.find_match(state, self.source, self.cursor) {
            Some((rule, caps)) => {
                self.emit(rule, &caps);
                self.cursor = caps.end;
                self.transition(rule.transition);
            }
            None => self.recover(state),
        }
    }

    fn emit(&mut self, rule: &Rule, caps: &Captures) {
        let start = self.cursor;
        let mut out: SmallVec<[Token; 8]> = SmallVec::new();
        match rule.action {
            Action::Single(kind) => out.push(Token::new(kind, start..caps.end)),
            Action::Groups(kinds) => {
                let mut last = start;
                for (&kind, group) in kinds.iter().zip(&caps.groups) {
                    if group.start > last {
                        out.push(Token::new(TokenKind::Text, last..group.start));
                    }
                    if !group.is_empty() {
                        out.push(Token::new(kind, group.clone()));
                    }
                    last = last.max(group.end);
                }
                if caps.end > last {
                    out.push(Token::new(TokenKind::Text, last..caps.end));
                }
            }
        }
        out.reverse();
        self.pending = out;
    }

    fn transition(&mut self, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::Push(state) => {
                self.stack.push(state);
                self.stats.pushes += 1;
                log_push(state, self.cursor);
            }
            Transition::Pop => {
                if self.stack.len() > 1 {
                    let state = self.stack.pop().unwrap_or_default();
                    self.stats.pops += 1;
                    log_pop(state, self.cursor);
                }
            }
        }
    }

    /// No rule matched: hand out one character as plain text and move on.
    fn recover(&mut self, state: LexState) {
        let width = self.source[self.cursor..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        let end = self.cursor + width;
        log_recovery(state, self.cursor);
        self.stats.recoveries += 1;
        self.pending.clear();
        self.pending.push(Token::new(TokenKind::Text, self.cursor..end));
        self.cursor = end;
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop() {
                return Some(token);
            }
            if self.cursor >= self.source.len() {
                if !self.finished {
                    self.finished = true;
                    log_finished(&self.stats, self.stack.len());
                }
                return None;
            }
            self.step();
        }
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

impl RuleTable {
    /// Tokenize `source` with this table.
    pub fn tokenize<'a>(&'a self, source: &'a str) -> Tokens<'a> {
        Tokens::new(self, source)
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[cfg(feature = "tracing")]
fn log_push(state: LexState, offset: usize) {
    tracing::trace!(state = state.name(), offset, "lexer state pushed");
}

#[cfg(not(feature = "tracing"))]
fn log_push(_state: LexState, _offset: usize) {}

#[cfg(feature = "tracing")]
fn log_pop(state: LexState, offset: usize) {
    tracing::trace!(state = state.name(), offset, "lexer state popped");
}

#[cfg(not(feature = "tracing"))]
fn log_pop(_state: LexState, _offset: usize) {}

#[cfg(feature = "tracing")]
fn log_recovery(state: LexState, offset: usize) {
    tracing::debug!(state = state.name(), offset, "no rule matched; consumed one char as text");
}

#[cfg(not(feature = "tracing"))]
fn log_recovery(_state: LexState, _offset: usize) {}

#[cfg(feature = "tracing")]
fn log_finished(stats: &LexStats, depth: usize) {
    tracing::debug!(
        steps = stats.steps,
        recoveries = stats.recoveries,
        pushes = stats.pushes,
        pops = stats.pops,
        open_states = depth - 1,
        "tokenization finished"
    );
}

#[cfg(not(feature = "tracing"))]
fn log_finished(_stats: &LexStats, _depth: usize) {}
