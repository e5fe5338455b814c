//! # mathflow-syntax
//!
//! A lossless scanner for fenced math blocks (`$$ ... $$`) using [Rowan] +
//! [Logos], following the [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## What It Recognizes
//!
//! ```text
//! $$              $$some math     $$
//! \frac{a}{b}     $$              some math$$ trailing text
//! $$
//! ```
//!
//! A block opens with a line-start run of two or more `$`, closes with a run
//! at least as long, and keeps every byte of its source. Text glued to either
//! fence is accepted. A run of `$` too short to close is just content.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Events → Sink → Rowan Tree
//!               (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! Every `$`, space and tab is its own token so the parser can measure fence
//! runs and indentation exactly.
//!
//! ```text
//! "$$ x\n" → [DOLLAR, DOLLAR, WHITESPACE, TEXT("x"), NEWLINE]
//! ```
//!
//! ### 2. Parser ([`parser`] module)
//!
//! The parser consumes tokens and emits **events**. Speculative matchers run
//! inside [`Parser::attempt`](parser::Parser::attempt), which rolls back
//! both cursor and events when they fail.
//!
//! ```text
//! Tokens → Events: [Start(MATH_FLOW), Start(MATH_FLOW_FENCE),
//!                   Token(FENCE_SEQUENCE), Finish, ...]
//! ```
//!
//! ### 3. Sink ([`parser::sink`] module)
//!
//! The sink replays events into a `GreenNodeBuilder`.
//!
//! ## Module Structure
//!
//! ```text
//! mathflow-syntax/
//! ├── lib.rs           # This file - public API and snapshot tests
//! ├── syntax_kind.rs   # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs         # Logos-based tokenizer
//! ├── options.rs       # Construct registry and lazy-line oracle
//! ├── ast.rs           # Typed MathFlow view over the tree
//! └── parser/
//!     ├── mod.rs       # Parser, Marker, speculation, parse()
//!     ├── event.rs     # Event enum (Start, Token, Finish, Placeholder)
//!     ├── sink.rs      # Converts events to Rowan GreenNode
//!     └── grammar/
//!         ├── mod.rs       # Root document parsing
//!         ├── block.rs     # Host: blank lines, paragraphs
//!         └── math_flow.rs # The math block state machine
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use mathflow_syntax::{ast, parse, SyntaxKind};
//!
//! let tree = parse("$$\nE = mc^2\n$$\n");
//!
//! // The tree preserves all text
//! assert_eq!(tree.text().to_string(), "$$\nE = mc^2\n$$\n");
//!
//! let block = ast::math_blocks(&tree).next().unwrap();
//! assert_eq!(block.syntax().kind(), SyntaxKind::MATH_FLOW);
//! assert_eq!(block.content(), "E = mc^2");
//! assert!(block.is_closed());
//! ```
//!
//! ## Embedding
//!
//! A host that nests documents (block quotes, list items) tells the scanner
//! which lines are lazy continuations and which constructs are off:
//!
//! ```
//! use std::collections::BTreeSet;
//! use mathflow_syntax::{ast, parse_with_options, Construct, Constructs, ParseOptions};
//!
//! let lazy: BTreeSet<usize> = [3].into_iter().collect();
//! let mut constructs = Constructs::default();
//! constructs.disable(Construct::CodeIndented);
//! let options = ParseOptions::new(constructs, &lazy);
//!
//! let tree = parse_with_options("$$\nx\ny\n$$\n", &options);
//! let block = ast::math_blocks(&tree).next().unwrap();
//! assert!(!block.is_closed());
//! assert_eq!(block.content(), "x");
//! ```

use std::fmt::Write;

use rowan::NodeOrToken;

pub mod ast;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod syntax_kind;

pub use options::{Construct, Constructs, LazyLines, NoLazyLines, ParseOptions, UnknownConstruct};
pub use parser::{Point, TAB_SIZE, parse, parse_with_options};
pub use syntax_kind::{MathFlowLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Render a tree as indented `KIND@range` lines, tokens with their text.
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    write_tree(&mut out, node, 0);
    out
}

fn write_tree(out: &mut String, node: &SyntaxNode, indent: usize) {
    let prefix = "  ".repeat(indent);
    let _ = writeln!(out, "{prefix}{:?}@{:?}", node.kind(), node.text_range());

    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => write_tree(out, &n, indent + 1),
            NodeOrToken::Token(t) => {
                let _ = writeln!(
                    out,
                    "{prefix}  {:?}@{:?} {:?}",
                    t.kind(),
                    t.text_range(),
                    t.text()
                );
            }
        }
    }
}
