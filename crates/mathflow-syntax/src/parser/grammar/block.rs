//! Block-level grammar rules for the host document.
//!
//! The host is deliberately small: blank lines, paragraphs, and math blocks.
//! It owns the decision of *where* a math block is tried (at line start, or
//! as an interruption of a running paragraph); what happens after that is
//! up to [`math_flow`].

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

use super::math_flow;

/// Parse a block element.
pub fn block(p: &mut Parser<'_, '_>) {
    // Blank line without indentation
    if p.eat(SyntaxKind::NEWLINE) {
        return;
    }

    if p.at_line_start() {
        if blank_line(p) {
            return;
        }
        if math_flow::math_flow(p, false) {
            return;
        }
    }

    // Also picks up whatever follows a closing fence on the same line
    paragraph(p);
}

/// Check if the rest of the line is only spaces and tabs.
fn is_blank_line(p: &Parser<'_, '_>) -> bool {
    let n = p.run_length(SyntaxKind::WHITESPACE);
    matches!(p.nth(n), SyntaxKind::NEWLINE | SyntaxKind::EOF)
}

/// Consume a whitespace-only line with its line ending.
fn blank_line(p: &mut Parser<'_, '_>) -> bool {
    if !is_blank_line(p) {
        return false;
    }
    p.eat_whitespace(SyntaxKind::WHITESPACE, None);
    p.eat(SyntaxKind::NEWLINE);
    true
}

/// Parse a paragraph (default block).
fn paragraph(p: &mut Parser<'_, '_>) {
    let m = p.start();

    // Consume until blank line or a construct that interrupts paragraphs
    loop {
        while !p.at_line_end() {
            p.bump();
        }

        if !p.eat(SyntaxKind::NEWLINE) {
            break;
        }

        if p.at_end() || is_blank_line(p) || math_flow::can_interrupt(p) {
            break;
        }
    }

    m.complete(p, SyntaxKind::PARAGRAPH);
}
