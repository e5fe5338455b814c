//! # Parser Events
//!
//! Events are the intermediate representation between parsing and tree building.
//! Instead of building the tree directly, the parser emits a **flat sequence**
//! of events that describe the tree structure.
//!
//! ## Why Events?
//!
//! A flat log is what makes speculation cheap. A checkpoint is just the log
//! length, and rolling back a failed attempt is a `truncate`. No tree node is
//! ever built for text that a later rollback takes back.
//!
//! ## Event Types
//!
//! ```text
//! Start(MATH_FLOW)            ← Begin a MATH_FLOW node
//!   Start(MATH_FLOW_FENCE)
//!     Token(FENCE_SEQUENCE×2) ← Two raw `$` tokens folded into one
//!   Finish
//!   Token(NEWLINE)
//!   ...
//! Finish                      ← End the MATH_FLOW node
//! ```
//!
//! The Sink processes these in order, maintaining a stack of open nodes.
//! Start pushes, Finish pops.

use crate::syntax_kind::SyntaxKind;

/// An event emitted by the parser during tree construction.
///
/// Events form a flat representation of the tree that the [`Sink`](super::sink::Sink)
/// converts into an actual Rowan tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node.
    Start { kind: SyntaxKind },

    /// Add a token to the current node.
    ///
    /// The `kind` is the lexer token kind for single tokens, or a grouped
    /// kind (`FENCE_SEQUENCE`, `LINE_PREFIX`, ...) when `n_raw_tokens` lexer
    /// tokens are folded into one.
    Token { kind: SyntaxKind, n_raw_tokens: u32 },

    /// Finish the current node.
    ///
    /// Must be paired with a preceding `Start`. The Sink pops the node
    /// stack when it sees this.
    Finish,

    /// A placeholder that will be replaced.
    ///
    /// When `parser.start()` is called, a `Placeholder` is pushed. Later,
    /// `marker.complete()` replaces it with a real `Start`, or
    /// `marker.abandon()` leaves it (the Sink ignores placeholders).
    Placeholder,
}

impl Event {
    /// Create a start event.
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start { kind }
    }

    /// Create a token event for a single raw token.
    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token {
            kind,
            n_raw_tokens: 1,
        }
    }
}
