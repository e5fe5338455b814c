//! # Math Flow
//!
//! A fenced math block:
//!
//! ```text
//! $$
//! \int_0^1 x\,dx
//! $$
//! ```
//!
//! On top of the classic layout, two glued layouts are accepted:
//!
//! - `$$content` - text after the opening fence is the first content value
//!   instead of a reason to reject the block.
//! - `content$$` - a run of `$` anywhere in a content line that is at least
//!   as long as the opening fence closes the block right there. Whatever
//!   follows on that line is left to the host.
//!
//! ## Shape
//!
//! ```text
//! MATH_FLOW
//!   MATH_FLOW_FENCE      opening: FENCE_SEQUENCE + trailing WHITESPACE
//!   NEWLINE
//!   LINE_PREFIX          indentation up to the opening fence's indent
//!   MATH_FLOW_VALUE      raw TEXT / WHITESPACE / DOLLAR tokens
//!   NEWLINE
//!   LINE_PREFIX          indentation before the closing fence
//!   MATH_FLOW_FENCE      closing (absent when the block runs to EOF)
//! ```
//!
//! ## The Body State Machine
//!
//! Once the opening fence is in, the body is driven by [`State`]. Each step
//! consumes at most one raw token, except for the two closing-fence matchers,
//! which look further ahead inside [`Parser::attempt`] and leave nothing
//! behind when they fail:
//!
//! ```text
//!            ┌──────── $ run < size: re-emit run as content ──┐
//!            ▼                                                │
//!  ──► Content ── $ ──► midline fence ── run ≥ size ──► Done  │
//!        │  ▲                  └──────────────────────────────┘
//!   EOL  │  │ LinePrefix (strip ≤ open indent)
//!        ▼  │
//!   LineBoundary ── lazy next line ──► Done
//!        └── strict fence ──► Done
//! ```

use crate::options::Construct;
use crate::parser::{Marker, Parser, TAB_SIZE};
use crate::syntax_kind::SyntaxKind;

/// Shortest run of `$` that opens a block.
const MIN_FENCE_SIZE: usize = 2;

/// Try a math block at the start of a line.
///
/// With `interrupt` set, the block is being checked as an interruption of a
/// paragraph; an opening fence with nothing after it is then enough and the
/// block ends right after it.
pub(super) fn math_flow(p: &mut Parser<'_, '_>, interrupt: bool) -> bool {
    if p.options().constructs.is_disabled(Construct::MathFlow) {
        return false;
    }

    p.attempt(|p| {
        let open_indent = p.eat_whitespace(SyntaxKind::LINE_PREFIX, indent_limit(p));
        MathFlow::recognize(p, open_indent, interrupt)
    })
}

/// Would a math block start here, cutting the current paragraph short?
pub(super) fn can_interrupt(p: &mut Parser<'_, '_>) -> bool {
    p.probe(|p| math_flow(p, true))
}

/// Exclusive column limit for indentation before a fence.
fn indent_limit(p: &Parser<'_, '_>) -> Option<usize> {
    if p.options().constructs.is_disabled(Construct::CodeIndented) {
        None
    } else {
        Some(TAB_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Inside a line: content, a possible midline fence, or the line end.
    Content,
    /// At a line ending: lazy guard, then the strict closing fence.
    LineBoundary,
    /// At the start of a content line: strip indentation.
    LinePrefix,
    Done,
}

struct MathFlow {
    fence_size: usize,
    open_indent: usize,
    /// The content value being scanned, if any.
    value: Option<Marker>,
}

impl MathFlow {
    fn recognize(p: &mut Parser<'_, '_>, open_indent: usize, interrupt: bool) -> bool {
        let Some(fence_size) = opening_run(p) else {
            return false;
        };

        let start = p.now();
        let m = p.start();
        opening_fence(p, fence_size);
        log::debug!("math flow opened at {start:?} with fence size {fence_size}");

        if interrupt && p.at_line_end() {
            m.complete(p, SyntaxKind::MATH_FLOW);
            return true;
        }

        let mut flow = MathFlow {
            fence_size,
            open_indent,
            value: None,
        };
        let mut state = State::Content;
        while state != State::Done {
            state = flow.step(p, state);
        }

        m.complete(p, SyntaxKind::MATH_FLOW);
        log::debug!("math flow from {start:?} ended at {:?}", p.now());
        true
    }

    fn step(&mut self, p: &mut Parser<'_, '_>, state: State) -> State {
        log::trace!("math flow {state:?} at {:?}", p.now());
        match state {
            State::Content => match p.current() {
                SyntaxKind::EOF => {
                    self.close_value(p);
                    State::Done
                }
                SyntaxKind::NEWLINE => {
                    self.close_value(p);
                    State::LineBoundary
                }
                SyntaxKind::DOLLAR => {
                    self.close_value(p);
                    let fence_size = self.fence_size;
                    if p.attempt(|p| closing_fence_midline(p, fence_size)) {
                        return State::Done;
                    }
                    // Too short to close: the whole run is content, and
                    // scanning resumes after it
                    let run = p.run_length(SyntaxKind::DOLLAR);
                    self.open_value(p);
                    for _ in 0..run {
                        p.bump();
                    }
                    State::Content
                }
                _ => {
                    self.open_value(p);
                    p.bump();
                    State::Content
                }
            },
            State::LineBoundary => {
                let next_line = p.now().line + 1;
                if p.options().lazy.is_lazy(next_line) {
                    log::trace!("line {next_line} is lazy, math flow ends");
                    return State::Done;
                }
                p.bump();
                let fence_size = self.fence_size;
                if p.attempt(|p| closing_fence_strict(p, fence_size)) {
                    State::Done
                } else {
                    State::LinePrefix
                }
            }
            State::LinePrefix => {
                if self.open_indent > 0 {
                    p.eat_whitespace(SyntaxKind::LINE_PREFIX, Some(self.open_indent + 1));
                }
                State::Content
            }
            State::Done => State::Done,
        }
    }

    fn open_value(&mut self, p: &mut Parser<'_, '_>) {
        if self.value.is_none() {
            self.value = Some(p.start());
        }
    }

    fn close_value(&mut self, p: &mut Parser<'_, '_>) {
        if let Some(m) = self.value.take() {
            m.complete(p, SyntaxKind::MATH_FLOW_VALUE);
        }
    }
}

/// Length of the `$` run at the cursor, if it is long enough to open.
fn opening_run(p: &Parser<'_, '_>) -> Option<usize> {
    let run = p.run_length(SyntaxKind::DOLLAR);
    (run >= MIN_FENCE_SIZE).then_some(run)
}

fn opening_fence(p: &mut Parser<'_, '_>, fence_size: usize) {
    let m = p.start();
    p.bump_n(fence_size, SyntaxKind::FENCE_SEQUENCE);
    p.eat_whitespace(SyntaxKind::WHITESPACE, None);
    m.complete(p, SyntaxKind::MATH_FLOW_FENCE);
}

/// A closing fence on a line of its own.
///
/// Indentation is bounded by the tab size unless indented code is disabled.
/// After the run only spaces and tabs may follow before the line ends.
fn closing_fence_strict(p: &mut Parser<'_, '_>, fence_size: usize) -> bool {
    p.eat_whitespace(SyntaxKind::LINE_PREFIX, indent_limit(p));

    let run = p.run_length(SyntaxKind::DOLLAR);
    if run < fence_size {
        return false;
    }

    let m = p.start();
    p.bump_n(run, SyntaxKind::FENCE_SEQUENCE);
    p.eat_whitespace(SyntaxKind::WHITESPACE, None);
    if !p.at_line_end() {
        m.abandon(p);
        return false;
    }
    m.complete(p, SyntaxKind::MATH_FLOW_FENCE);
    log::trace!("strict closing fence of size {run}");
    true
}

/// A closing fence right at the cursor, anywhere in a content line.
fn closing_fence_midline(p: &mut Parser<'_, '_>, fence_size: usize) -> bool {
    let run = p.run_length(SyntaxKind::DOLLAR);
    if run < fence_size {
        return false;
    }

    let m = p.start();
    p.bump_n(run, SyntaxKind::FENCE_SEQUENCE);
    m.complete(p, SyntaxKind::MATH_FLOW_FENCE);
    log::trace!("midline closing fence of size {run}");
    true
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::ast::{MathFlow as MathBlock, math_blocks};
    use crate::lexer::lex;
    use crate::options::{Constructs, ParseOptions};
    use crate::parser::{parse, parse_with_options};
    use crate::syntax_kind::SyntaxNode;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn blocks(tree: &SyntaxNode) -> Vec<MathBlock> {
        math_blocks(tree).collect()
    }

    fn only_block(input: &str) -> MathBlock {
        let tree = parse(input);
        assert_eq!(tree.text().to_string(), input, "round-trip");
        let mut found = blocks(&tree);
        assert_eq!(found.len(), 1, "expected one math block in {input:?}");
        found.remove(0)
    }

    fn with_lazy(input: &str, lazy: &[usize]) -> SyntaxNode {
        let lazy: BTreeSet<usize> = lazy.iter().copied().collect();
        let options = ParseOptions {
            lazy: &lazy,
            ..ParseOptions::default()
        };
        let tree = parse_with_options(input, &options);
        assert_eq!(tree.text().to_string(), input, "round-trip");
        tree
    }

    fn disabled(construct: Construct) -> Constructs {
        [construct].into_iter().collect()
    }

    #[rstest]
    #[case::canonical("$$\nx\n$$", "x")]
    #[case::same_line_open("$$some math\n$$", "some math")]
    #[case::same_line_close("$$\nsome math$$", "some math")]
    #[case::both_glued("$$a+b$$", "a+b")]
    #[case::space_after_open("$$ a+b\n$$", "a+b")]
    #[case::multi_line("$$\na\n\nb\n$$\n", "a\n\nb")]
    #[case::trailing_whitespace_on_close("$$\nx\n$$  \n", "x")]
    #[case::crlf("$$\r\nx\r\n$$\r\n", "x")]
    fn closed_block_content(#[case] input: &str, #[case] content: &str) {
        let block = only_block(input);
        assert!(block.is_closed(), "{input:?} should close");
        assert_eq!(block.content(), content);
    }

    #[test]
    fn canonical_block_shape() {
        let block = only_block("$$\nx\n$$");
        assert_eq!(block.fence_size(), 2);
        assert_eq!(block.closing_fence_size(), Some(2));
        assert_eq!(block.values(), vec!["x".to_string()]);
        assert_eq!(block.syntax().text().to_string(), "$$\nx\n$$");
    }

    #[test]
    fn unclosed_block_runs_to_end_of_input() {
        let block = only_block("$$\nx");
        assert!(!block.is_closed());
        assert_eq!(block.content(), "x");
        assert_eq!(block.syntax().text().to_string(), "$$\nx");
    }

    #[test]
    fn unclosed_block_keeps_final_line_ending() {
        let block = only_block("$$\nx\n");
        assert!(!block.is_closed());
        assert_eq!(block.syntax().text().to_string(), "$$\nx\n");
        assert_eq!(block.content(), "x");
    }

    #[test]
    fn lone_fence_is_an_empty_unclosed_block() {
        let block = only_block("$$");
        assert!(!block.is_closed());
        assert_eq!(block.content(), "");
    }

    #[rstest]
    #[case("$a$")]
    #[case("$\nx\n$")]
    #[case("a $$ b\nx\n")]
    fn single_dollar_never_opens(#[case] input: &str) {
        let tree = parse(input);
        assert!(blocks(&tree).is_empty(), "{input:?} opened a block");
        assert_eq!(tree.text().to_string(), input);
    }

    #[test]
    fn glued_close_leaves_trailing_text_to_host() {
        let tree = parse("$$\nsome math$$ tail\n");
        let block = &blocks(&tree)[0];
        assert_eq!(block.syntax().text().to_string(), "$$\nsome math$$");
        let after = block.syntax().next_sibling().unwrap();
        assert_eq!(after.kind(), SyntaxKind::PARAGRAPH);
        assert_eq!(after.text().to_string(), " tail\n");
    }

    #[test]
    fn shorter_closing_run_never_closes() {
        let block = only_block("$$$\nx\n$$\n$$$");
        assert_eq!(block.fence_size(), 3);
        assert_eq!(block.closing_fence_size(), Some(3));
        assert_eq!(block.content(), "x\n$$");
    }

    #[test]
    fn shorter_run_only_leaves_block_unclosed() {
        let block = only_block("$$$\nx $$ y\n$$");
        assert!(!block.is_closed());
        assert_eq!(block.content(), "x $$ y\n$$");
    }

    #[test]
    fn longer_closing_run_closes() {
        let block = only_block("$$\nx\n$$$$");
        assert_eq!(block.closing_fence_size(), Some(4));
    }

    #[rstest]
    #[case::single_dollar("$$\na $ b\n$$", vec!["a ", "$ b"])]
    #[case::run_one_short("$$$\na $$ b\n$$$", vec!["a ", "$$ b"])]
    #[case::both("$$$\na $ b $$ c\n$$$", vec!["a ", "$ b ", "$$ c"])]
    #[case::line_start("$$\n$x\n$$", vec!["$x"])]
    #[case::glued_open("$$a$b$$", vec!["a", "$b"])]
    fn failed_midline_attempt_resumes_after_whole_run(
        #[case] input: &str,
        #[case] values: Vec<&str>,
    ) {
        let block = only_block(input);
        assert!(block.is_closed());
        assert_eq!(block.values(), values);
        assert_eq!(block.content(), values.concat());
    }

    #[test]
    fn strict_fence_with_trailing_text_falls_back_to_midline() {
        let tree = parse("$$\nx\n$$ y");
        let block = &blocks(&tree)[0];
        assert_eq!(block.syntax().text().to_string(), "$$\nx\n$$");
        assert_eq!(block.content(), "x");
        let after = block.syntax().next_sibling().unwrap();
        assert_eq!(after.text().to_string(), " y");
    }

    #[test]
    fn empty_block_on_one_line() {
        let block = only_block("$$ $$");
        assert!(block.is_closed());
        assert_eq!(block.content(), "");
        assert!(block.values().is_empty());
    }

    #[rstest]
    #[case::three_spaces("$$\nx\n   $$", "x")]
    #[case::tab_is_four_columns("$$\nx\n\t$$", "x\n\t")]
    #[case::four_spaces("$$\nx\n    $$", "x\n    ")]
    fn closing_indent_bounded_by_tab_size(#[case] input: &str, #[case] content: &str) {
        // Past the limit the fence is still found midline, but the
        // indentation is content rather than a line prefix
        let block = only_block(input);
        assert!(block.is_closed());
        assert_eq!(block.content(), content);
    }

    #[test]
    fn closing_indent_unbounded_without_indented_code() {
        let options = ParseOptions {
            constructs: disabled(Construct::CodeIndented),
            ..ParseOptions::default()
        };
        let tree = parse_with_options("$$\nx\n        $$", &options);
        let block = &blocks(&tree)[0];
        assert!(block.is_closed());
        assert_eq!(block.content(), "x");
    }

    #[test]
    fn opening_indent_of_four_is_not_a_fence() {
        let tree = parse("    $$\n    x\n    $$");
        assert!(blocks(&tree).is_empty());

        let options = ParseOptions {
            constructs: disabled(Construct::CodeIndented),
            ..ParseOptions::default()
        };
        let tree = parse_with_options("    $$\n    x\n    $$", &options);
        let block = &blocks(&tree)[0];
        assert_eq!(block.content(), "x");
    }

    #[rstest]
    #[case::strips_open_indent("  $$\n  x\n  $$", "x")]
    #[case::keeps_deeper_indent("  $$\n    x\n  $$", "  x")]
    #[case::strips_what_is_there("  $$\n x\n  $$", "x")]
    #[case::no_open_indent_no_strip("$$\n  x\n$$", "  x")]
    fn content_prefix_capped_at_open_indent(#[case] input: &str, #[case] content: &str) {
        let block = only_block(input);
        assert_eq!(block.content(), content);
    }

    #[test]
    fn lazy_line_ends_block_before_it() {
        let tree = with_lazy("$$\nx", &[2]);
        let block = &blocks(&tree)[0];
        assert!(!block.is_closed());
        assert_eq!(block.syntax().text().to_string(), "$$");
        assert_eq!(block.content(), "");
    }

    #[test]
    fn lazy_line_in_the_middle_ends_block() {
        let tree = with_lazy("$$\nx\ny\n$$\n", &[3]);
        let block = &blocks(&tree)[0];
        assert!(!block.is_closed());
        assert_eq!(block.syntax().text().to_string(), "$$\nx");
        assert_eq!(block.content(), "x");
    }

    #[test]
    fn lazy_line_is_not_a_fence_candidate() {
        let tree = with_lazy("$$\nx\n$$\n", &[3]);
        let first = &blocks(&tree)[0];
        assert!(!first.is_closed());
        assert_eq!(first.syntax().text().to_string(), "$$\nx");
    }

    #[test]
    fn lazy_lines_outside_the_block_are_ignored() {
        let tree = with_lazy("$$\nx\n$$\n", &[1, 5]);
        let block = &blocks(&tree)[0];
        assert!(block.is_closed());
        assert_eq!(block.content(), "x");
    }

    fn run_math_flow(input: &str, interrupt: bool) -> (bool, usize) {
        let tokens = lex(input);
        let options = ParseOptions::default();
        let mut p = Parser::new(&tokens, &options);
        let ok = math_flow(&mut p, interrupt);
        (ok, p.now().offset)
    }

    #[test]
    fn interrupt_with_empty_meta_ends_after_fence() {
        assert_eq!(run_math_flow("$$\nx\n$$", true), (true, 2));
        assert_eq!(run_math_flow("$$  \nx\n$$", true), (true, 4));
    }

    #[test]
    fn interrupt_with_same_line_content_scans_on() {
        assert_eq!(run_math_flow("$$x\n$$", true), (true, 6));
    }

    #[test]
    fn without_interrupt_the_body_is_scanned() {
        assert_eq!(run_math_flow("$$\nx\n$$\ny", false), (true, 7));
    }

    #[test]
    fn failed_open_leaves_cursor_in_place() {
        assert_eq!(run_math_flow("  $x", false), (false, 0));
    }

    #[test]
    fn interrupt_probe_does_not_shorten_the_real_block() {
        let tree = parse("para\n$$\nx\n$$\n");
        let block = &blocks(&tree)[0];
        assert!(block.is_closed());
        assert_eq!(block.content(), "x");
    }
}
