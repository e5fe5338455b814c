//! # Parser - Event-Based Tree Construction
//!
//! This module implements the token-stream engine the grammar runs on,
//! following the **event-based** architecture from rust-analyzer.
//!
//! ## The Event Model
//!
//! Parsing produces a flat list of [`Event`]s rather than a tree:
//! ```text
//! Start(MATH_FLOW)
//! Start(MATH_FLOW_FENCE)
//! Token(FENCE_SEQUENCE)
//! Finish
//! Token(NEWLINE)
//! ...
//! Finish
//! ```
//!
//! The [`Sink`] processes these in order, calling `start_node()` for Start,
//! `token()` for Token, and `finish_node()` for Finish.
//!
//! ## Primitives
//!
//! Grammar code only talks to the [`Parser`]:
//!
//! | Primitive | Meaning |
//! |-----------|---------|
//! | [`Parser::bump`] / [`Parser::bump_n`] | consume one raw token / fold n into one |
//! | [`Parser::start`] → [`Marker`] | enter a span; `complete` exits it |
//! | [`Parser::attempt`] | run a matcher, roll back cursor + events on failure |
//! | [`Parser::probe`] | run a matcher and always roll back |
//! | [`Parser::now`] | current line/column/offset |
//! | [`Parser::eat_whitespace`] | whitespace run with an optional column limit |
//! | [`Parser::at_line_end`] | line ending or end of input ahead |
//! | [`Parser::options`] | injected construct registry and lazy-line oracle |
//!
//! ## The Marker System
//!
//! When you call `parser.start()`, you get a `Marker`. This marker **must**
//! be either completed with `marker.complete(parser, KIND)` or abandoned with
//! `marker.abandon(parser)`. Dropping it otherwise panics, which catches
//! unbalanced trees at runtime.
//!
//! ```ignore
//! let m = p.start();
//! p.bump();
//! m.complete(p, SyntaxKind::MATH_FLOW_VALUE);
//! ```
//!
//! ## Speculation
//!
//! A [`Checkpoint`] is the cursor plus the event log length. `attempt`
//! takes one, runs the closure, and on `false` truncates the log and resets
//! the cursor, so a failed lookahead leaves nothing behind.
//!
//! ## Public API
//!
//! ```
//! use mathflow_syntax::parse;
//!
//! let tree = parse("$$\nx\n$$\n");
//! println!("{:#?}", tree);
//! ```

pub mod event;
pub mod sink;

mod grammar;

use crate::lexer::{Token, lex};
use crate::options::ParseOptions;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use sink::Sink;

/// Tab stops are every 4 columns; also the indentation at which a line
/// stops being a fence candidate (unless indented code is disabled).
pub const TAB_SIZE: usize = 4;

/// A position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, with tabs expanded to the next tab stop.
    pub column: usize,
    /// Byte offset into the source.
    pub offset: usize,
}

/// A saved cursor position and event log length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pos: usize,
    events: usize,
}

/// The parser state machine.
///
/// Holds the token stream, current position, and accumulated events.
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    /// `points[i]` is where token `i` starts; the extra last entry is the end.
    points: Vec<Point>,
    pos: usize,
    events: Vec<Event>,
    options: &'t ParseOptions<'t>,
}

impl<'t, 'input> Parser<'t, 'input> {
    /// Create a new parser from a slice of tokens.
    pub fn new(tokens: &'t [Token<'input>], options: &'t ParseOptions<'t>) -> Self {
        Self {
            tokens,
            points: points(tokens),
            pos: 0,
            events: Vec::new(),
            options,
        }
    }

    /// Parse the tokens and return a syntax tree.
    pub fn parse(mut self) -> SyntaxNode {
        grammar::root(&mut self);
        let sink = Sink::new(self.tokens, self.events);
        sink.finish()
    }

    /// The injected construct registry and lazy-line oracle.
    pub fn options(&self) -> &'t ParseOptions<'t> {
        self.options
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker {
            pos,
            completed: false,
        }
    }

    /// Current token kind, or EOF if past end.
    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Look ahead n tokens.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::EOF)
    }

    /// Check if at end of input.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Check if current token is of given kind.
    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Check if a line ending or the end of input is next.
    pub fn at_line_end(&self) -> bool {
        self.at_end() || self.at(SyntaxKind::NEWLINE)
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) {
        if !self.at_end() {
            let kind = self.current();
            self.events.push(Event::token(kind));
            self.pos += 1;
        }
    }

    /// Consume n tokens as a single composite token.
    pub fn bump_n(&mut self, n: usize, kind: SyntaxKind) {
        if n > 0 && self.pos + n <= self.tokens.len() {
            self.events.push(Event::Token {
                kind,
                n_raw_tokens: n as u32,
            });
            self.pos += n;
        }
    }

    /// Number of consecutive tokens of `kind` starting at the cursor.
    pub fn run_length(&self, kind: SyntaxKind) -> usize {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .take_while(|t| t.kind == kind)
            .count()
    }

    /// Consume a run of spaces and tabs as one `kind` token.
    ///
    /// `max` is an exclusive column limit: at most `max - 1` columns are
    /// taken, and a tab that would cross the limit is left alone. `None`
    /// takes the whole run. Returns the number of columns consumed.
    pub fn eat_whitespace(&mut self, kind: SyntaxKind, max: Option<usize>) -> usize {
        let limit = max.map_or(usize::MAX, |max| max.saturating_sub(1));
        let mut size = 0;
        let mut n = 0;

        while self.nth(n) == SyntaxKind::WHITESPACE {
            let i = self.pos + n;
            let width = self.points[i + 1].column - self.points[i].column;
            if size + width > limit {
                break;
            }
            size += width;
            n += 1;
        }

        self.bump_n(n, kind);
        size
    }

    /// Get the text of the current token.
    pub fn current_text(&self) -> &'input str {
        self.tokens.get(self.pos).map(|t| t.text).unwrap_or("")
    }

    /// Check if we're at the start of a line (after newline or at start).
    pub fn at_line_start(&self) -> bool {
        if self.pos == 0 {
            return true;
        }
        // Check if previous token was a newline
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.kind == SyntaxKind::NEWLINE)
            .unwrap_or(false)
    }

    /// Where the cursor is.
    pub fn now(&self) -> Point {
        self.points[self.pos.min(self.tokens.len())]
    }

    /// Save the cursor and the event log length.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            events: self.events.len(),
        }
    }

    /// Restore a checkpoint, discarding every event pushed since.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.events.truncate(checkpoint.events);
        self.pos = checkpoint.pos;
    }

    /// Run `matcher` speculatively.
    ///
    /// On `true` its events and cursor movement are kept. On `false` the
    /// parser is restored to exactly where it was before the call.
    pub fn attempt<F>(&mut self, matcher: F) -> bool
    where
        F: FnOnce(&mut Self) -> bool,
    {
        let checkpoint = self.checkpoint();
        if matcher(self) {
            true
        } else {
            log::trace!("attempt failed at {:?}, rolling back", self.now());
            self.rollback(checkpoint);
            false
        }
    }

    /// Run `matcher` and roll back whatever it did, returning its verdict.
    pub fn probe<F>(&mut self, matcher: F) -> bool
    where
        F: FnOnce(&mut Self) -> bool,
    {
        let checkpoint = self.checkpoint();
        let ok = matcher(self);
        self.rollback(checkpoint);
        ok
    }
}

/// Start position of every token, plus the end of input.
fn points(tokens: &[Token<'_>]) -> Vec<Point> {
    let mut points = Vec::with_capacity(tokens.len() + 1);
    let mut point = Point {
        line: 1,
        column: 1,
        offset: 0,
    };

    for token in tokens {
        points.push(point);
        point.offset += token.text.len();
        match token.kind {
            SyntaxKind::NEWLINE => {
                point.line += 1;
                point.column = 1;
            }
            SyntaxKind::WHITESPACE if token.text == "\t" => {
                point.column = (point.column - 1) / TAB_SIZE * TAB_SIZE + TAB_SIZE + 1;
            }
            _ => point.column += token.text.chars().count(),
        }
    }

    points.push(point);
    points
}

/// A marker for a node being constructed.
///
/// When you call `parser.start()`, a `Placeholder` event is pushed and you
/// get a `Marker` pointing to it.
///
/// ## The Must-Use Contract
///
/// The `#[must_use]` attribute and the `Drop` impl together enforce that
/// every marker is either:
///
/// - **Completed** via `marker.complete(parser, KIND)` - converts the
///   placeholder to a `Start` event and pushes a `Finish` event
/// - **Abandoned** via `marker.abandon(parser)` - removes the placeholder
///   (only works if nothing was pushed after it)
///
/// Markers started inside an [`attempt`](Parser::attempt) must be settled
/// before the matcher returns; a rollback then discards their events.
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    /// Position in the events vector where our Placeholder lives
    pos: usize,
    /// Tracks whether complete() or abandon() was called
    completed: bool,
}

impl Marker {
    /// Complete this marker, creating a node of the given kind.
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) {
        self.completed = true;
        let event_at_pos = &mut p.events[self.pos];
        assert!(matches!(event_at_pos, Event::Placeholder));
        *event_at_pos = Event::start(kind);
        p.events.push(Event::Finish);
    }

    /// Abandon this marker without creating a node.
    ///
    /// **Note**: This only removes the placeholder if it's the last event.
    /// If other events were pushed after `start()`, the placeholder becomes
    /// inert and is ignored by the Sink.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        if self.pos == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Placeholder) => {}
                _ => unreachable!(),
            }
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// Parse source into a syntax tree with default options.
pub fn parse(source: &str) -> SyntaxNode {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse source into a syntax tree with the given collaborators.
pub fn parse_with_options(source: &str, options: &ParseOptions<'_>) -> SyntaxNode {
    let tokens = lex(source);
    let parser = Parser::new(&tokens, options);
    parser.parse()
}
