//! SyntaxKind enum for all tokens and nodes in the math-flow CST.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Every byte in the source must appear as a token in the tree.

/// All syntax kinds for the math-flow CST.
///
/// Raw tokens come straight from the lexer. Grouped tokens are produced by the
/// parser when it folds several raw tokens into one (`bump_n`). Nodes are the
/// labeled spans of the tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Raw tokens (lexer output) ===
    /// A single space or tab; the parser regroups runs of these
    WHITESPACE,
    /// Line ending (`\n`, `\r\n` or `\r`)
    NEWLINE,
    /// A single `$`
    DOLLAR,
    /// Run of anything that is not whitespace, a line ending or `$`
    TEXT,

    // === Grouped tokens (parser output) ===
    /// Indentation stripped before a fence or content line
    LINE_PREFIX,
    /// A run of `$` forming a fence
    FENCE_SEQUENCE,
    /// End of file marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root document node
    ROOT,
    /// Lines of text that are not a math block
    PARAGRAPH,
    /// A whole math block, from opening fence to closing fence
    MATH_FLOW,
    /// Opening or closing fence, holding exactly one FENCE_SEQUENCE
    MATH_FLOW_FENCE,
    /// A contiguous run of math content on one line
    MATH_FLOW_VALUE,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (lexer or grouped).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MathFlowLang {}

impl rowan::Language for MathFlowLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::MATH_FLOW_VALUE as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<MathFlowLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<MathFlowLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<MathFlowLang>;
