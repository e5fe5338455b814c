//! # Grammar Rules
//!
//! This module contains the grammar rules that drive parsing. Each function
//! takes a `&mut Parser` and uses its methods to:
//!
//! 1. Inspect the current token (`p.current()`, `p.at()`, `p.nth()`)
//! 2. Consume tokens (`p.bump()`, `p.eat()`, `p.eat_whitespace()`)
//! 3. Build tree structure (`p.start()` → marker → `complete()`/`abandon()`)
//! 4. Speculate (`p.attempt()`, `p.probe()`)
//!
//! ## Module Structure
//!
//! - [`block`] - The host document: blank lines, paragraphs, and the
//!   decision of *where* a math block is tried
//! - [`math_flow`] - The math block recognizer itself
//!
//! ## Error Recovery
//!
//! There are no errors. A construct that does not match is rolled back and
//! the host falls through to a paragraph, so every input produces a tree
//! that preserves all bytes.

mod block;
mod math_flow;

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse the root document.
///
/// This is the entry point for parsing. It creates a ROOT node containing
/// all top-level blocks in the document.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();

    while !p.at_end() {
        block::block(p);
    }

    m.complete(p, SyntaxKind::ROOT);
}
