//! Typed views over the untyped Rowan tree.
//!
//! The tree itself only knows kinds and ranges. These wrappers answer the
//! questions a consumer actually asks of a math block: how big was the
//! fence, did it close, and what is the math.

use rowan::NodeOrToken;

use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// A `MATH_FLOW` node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MathFlow(SyntaxNode);

impl MathFlow {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::MATH_FLOW).then_some(Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    fn fences(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::MATH_FLOW_FENCE)
    }

    /// Number of `$` in the opening fence.
    pub fn fence_size(&self) -> usize {
        self.fences().next().map_or(0, |fence| sequence_len(&fence))
    }

    /// Number of `$` in the closing fence, if the block closed.
    pub fn closing_fence_size(&self) -> Option<usize> {
        self.fences().nth(1).map(|fence| sequence_len(&fence))
    }

    pub fn is_closed(&self) -> bool {
        self.closing_fence_size().is_some()
    }

    /// Each content value span, in order.
    ///
    /// A line may hold more than one span when a `$` run too short to close
    /// the block started a new one.
    pub fn values(&self) -> Vec<String> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::MATH_FLOW_VALUE)
            .map(|n| n.text().to_string())
            .collect()
    }

    /// The math between the fences.
    ///
    /// Line prefixes are stripped. The line ending right after the opening
    /// fence and the one right before the closing fence (or end of block)
    /// are not part of the math.
    pub fn content(&self) -> String {
        let mut pieces: Vec<String> = Vec::new();

        for element in self.0.children_with_tokens() {
            match element {
                NodeOrToken::Node(n) if n.kind() == SyntaxKind::MATH_FLOW_VALUE => {
                    pieces.push(n.text().to_string());
                }
                NodeOrToken::Token(t) if t.kind() == SyntaxKind::NEWLINE => {
                    pieces.push(t.text().to_string());
                }
                _ => {}
            }
        }

        let is_newline = |piece: &String| piece.ends_with(['\n', '\r']);
        let start = usize::from(pieces.first().is_some_and(is_newline));
        let end = if pieces.len() > start && pieces.last().is_some_and(is_newline) {
            pieces.len() - 1
        } else {
            pieces.len()
        };

        pieces[start..end].concat()
    }
}

fn sequence_len(fence: &SyntaxNode) -> usize {
    fence
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == SyntaxKind::FENCE_SEQUENCE)
        .map_or(0, |t| t.text().len())
}

/// Every math block under `root`, in document order.
pub fn math_blocks(root: &SyntaxNode) -> impl Iterator<Item = MathFlow> {
    root.descendants().filter_map(MathFlow::cast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn cast_rejects_other_kinds() {
        let tree = parse("text\n");
        assert!(MathFlow::cast(tree.clone()).is_none());
        let para = tree.children().next().unwrap();
        assert!(MathFlow::cast(para).is_none());
    }

    #[test]
    fn math_blocks_in_document_order() {
        let tree = parse("$$\na\n$$\n\nprose\n\n$$$\nb\n$$$\n");
        let contents: Vec<_> = math_blocks(&tree).map(|b| b.content()).collect();
        assert_eq!(contents, vec!["a", "b"]);
        let sizes: Vec<_> = math_blocks(&tree).map(|b| b.fence_size()).collect();
        assert_eq!(sizes, vec![2, 3]);
    }

    #[test]
    fn value_that_is_a_line_ending_is_not_mistaken_for_one() {
        // Blank lines inside the block are NEWLINE tokens, never values
        let tree = parse("$$\n\n\n$$");
        let block = math_blocks(&tree).next().unwrap();
        assert!(block.values().is_empty());
        assert_eq!(block.content(), "\n");
    }

    #[test]
    fn unclosed_block_has_no_closing_size() {
        let tree = parse("$$$\nx");
        let block = math_blocks(&tree).next().unwrap();
        assert_eq!(block.fence_size(), 3);
        assert_eq!(block.closing_fence_size(), None);
        assert!(!block.is_closed());
    }
}
