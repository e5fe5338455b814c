//! # Lexer - Tokenizing Source Text
//!
//! This module provides the first stage of parsing: breaking source text into
//! tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte in the input appears in exactly one token. We never skip or
//! discard characters, which is what makes round-tripping possible:
//!
//! ```
//! use mathflow_syntax::lexer::lex;
//!
//! let input = "$$\nx^2\n$$\n";
//! let tokens = lex(input);
//!
//! // Concatenating all token texts gives back the original
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Token Granularity
//!
//! The scanner counts things one character at a time: fence runs are
//! compared against the opening fence length, and indentation is stripped up
//! to a column limit. So `$` and each space or tab is its own token, and the
//! parser folds runs of them back into one grouped token (`FENCE_SEQUENCE`,
//! `LINE_PREFIX`, `WHITESPACE`) when it emits events.
//!
//! Everything else becomes `TEXT`, grouped into runs of consecutive
//! characters (e.g., "x^2" is one TEXT token, not three).
//!
//! ## Public API
//!
//! - [`lex`] - Tokenize input, returning `Vec<Token>`
//! - [`lex_with_spans`] - Tokenize with byte offset spans
//! - [`Token`] - A token with its kind and text slice

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// This enum exists separately from [`SyntaxKind`] because Logos needs to
/// derive on it. Each variant maps to a raw `SyntaxKind` token.
///
/// [`SyntaxKind`]: crate::syntax_kind::SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// One space or tab
    #[regex(r"[ \t]")]
    Whitespace,

    /// Line ending (LF, CRLF or lone CR)
    #[regex(r"\r\n|\r|\n")]
    Newline,

    /// One `$`
    #[token("$")]
    Dollar,

    /// Plain text - anything not matched by other rules
    #[regex(r"[^ \t\r\n$]+")]
    Text,
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Newline => SyntaxKind::NEWLINE,
            TokenKind::Dollar => SyntaxKind::DOLLAR,
            TokenKind::Text => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with_spans(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Lex and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        // Logos error means unrecognized input - keep it as TEXT
        let kind = result.map_or(SyntaxKind::TEXT, TokenKind::to_syntax_kind);
        tokens.push((Token { kind, text }, span));
    }

    tokens
}
