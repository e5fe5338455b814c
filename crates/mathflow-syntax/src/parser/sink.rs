//! Sink for converting parser events into a Rowan green tree.

use rowan::GreenNodeBuilder;

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// Converts parser events and tokens into a Rowan syntax tree.
pub struct Sink<'t, 'input> {
    builder: GreenNodeBuilder<'static>,
    tokens: &'t [Token<'input>],
    cursor: usize,
    events: Vec<Event>,
}

impl<'t, 'input> Sink<'t, 'input> {
    /// Create a new sink.
    pub fn new(tokens: &'t [Token<'input>], events: Vec<Event>) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            tokens,
            cursor: 0,
            events,
        }
    }

    /// Consume the sink and build the syntax tree.
    pub fn finish(mut self) -> SyntaxNode {
        let events = std::mem::take(&mut self.events);

        for event in events {
            match event {
                Event::Start { kind } => {
                    debug_assert!(kind.is_node(), "{kind:?} is not a node kind");
                    self.builder.start_node(kind.into());
                }
                Event::Token { kind, n_raw_tokens } => {
                    self.token(kind, n_raw_tokens as usize);
                }
                Event::Finish => self.builder.finish_node(),
                Event::Placeholder => {}
            }
        }

        debug_assert_eq!(
            self.cursor,
            self.tokens.len(),
            "every raw token must be attached to the tree"
        );

        SyntaxNode::new_root(self.builder.finish())
    }

    fn token(&mut self, kind: SyntaxKind, n_raw_tokens: usize) {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        // Accumulate text from n_raw_tokens
        let start = self.cursor;
        self.cursor += n_raw_tokens;
        let text: String = self.tokens[start..self.cursor]
            .iter()
            .map(|t| t.text)
            .collect();
        self.builder.token(kind.into(), &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn token(kind: SyntaxKind, text: &str) -> Token<'_> {
        Token { kind, text }
    }

    #[test]
    fn sink_builds_simple_tree() {
        let tokens = vec![token(SyntaxKind::TEXT, "x")];

        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::start(SyntaxKind::MATH_FLOW_VALUE),
            Event::token(SyntaxKind::TEXT),
            Event::Finish,
            Event::Finish,
        ];

        let sink = Sink::new(&tokens, events);
        let tree = sink.finish();

        assert_eq!(tree.kind(), SyntaxKind::ROOT);
        assert_eq!(tree.children().count(), 1);
    }

    #[test]
    fn sink_groups_raw_tokens() {
        let input = "$$";
        let tokens = lex(input);

        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::start(SyntaxKind::MATH_FLOW_FENCE),
            Event::Token {
                kind: SyntaxKind::FENCE_SEQUENCE,
                n_raw_tokens: 2, // two DOLLAR tokens become one sequence
            },
            Event::Finish,
            Event::Finish,
        ];

        let sink = Sink::new(&tokens, events);
        let tree = sink.finish();

        assert_eq!(tree.text().to_string(), input);
        let fence = tree.children().next().unwrap();
        let sequence = fence.first_token().unwrap();
        assert_eq!(sequence.kind(), SyntaxKind::FENCE_SEQUENCE);
        assert_eq!(sequence.text(), "$$");
    }

    #[test]
    #[cfg(debug_assertions)]
    fn sink_rejects_token_kind_as_node() {
        let tokens = lex("x");
        let events = vec![
            Event::start(SyntaxKind::TEXT),
            Event::token(SyntaxKind::TEXT),
            Event::Finish,
        ];

        let result = std::panic::catch_unwind(|| Sink::new(&tokens, events).finish());
        assert!(result.is_err());
    }

    #[test]
    fn sink_ignores_placeholders() {
        let tokens = lex("x");
        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::Placeholder,
            Event::token(SyntaxKind::TEXT),
            Event::Finish,
        ];

        let tree = Sink::new(&tokens, events).finish();
        assert_eq!(tree.children().count(), 0);
        assert_eq!(tree.text().to_string(), "x");
    }
}
