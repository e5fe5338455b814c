//! Read-only collaborators injected into the parser.
//!
//! The scanner never reaches for ambient state. Whatever it needs to know
//! about the surrounding document comes in through [`ParseOptions`]:
//!
//! - [`Constructs`]: which constructs are disabled. Disabling
//!   [`Construct::CodeIndented`] lifts the indentation limit on fences.
//! - [`LazyLines`]: which lines are lazy continuations owned by a shallower
//!   enclosing block. A math block never absorbs such a line.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Constructs the host can switch off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Construct {
    /// Indented code. When disabled, fences may be indented without limit.
    CodeIndented,
    /// The math block itself. When disabled, `$$` lines are plain text.
    MathFlow,
}

impl Construct {
    pub const ALL: [Construct; 2] = [Construct::CodeIndented, Construct::MathFlow];

    /// The name used in configuration files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Construct::CodeIndented => "code_indented",
            Construct::MathFlow => "math_flow",
        }
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown construct `{name}` (expected one of: code_indented, math_flow)")]
pub struct UnknownConstruct {
    pub name: String,
}

impl FromStr for Construct {
    type Err = UnknownConstruct;

    /// Accepts `snake_case`, `kebab-case` and `camelCase` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "codeindented" => Ok(Construct::CodeIndented),
            "mathflow" => Ok(Construct::MathFlow),
            _ => Err(UnknownConstruct {
                name: s.to_string(),
            }),
        }
    }
}

/// Registry of disabled constructs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constructs {
    disabled: BTreeSet<Construct>,
}

impl Constructs {
    pub fn disable(&mut self, construct: Construct) -> &mut Self {
        self.disabled.insert(construct);
        self
    }

    pub fn is_disabled(&self, construct: Construct) -> bool {
        self.disabled.contains(&construct)
    }

    pub fn disabled(&self) -> impl Iterator<Item = Construct> + '_ {
        self.disabled.iter().copied()
    }
}

impl FromIterator<Construct> for Constructs {
    fn from_iter<I: IntoIterator<Item = Construct>>(iter: I) -> Self {
        Self {
            disabled: iter.into_iter().collect(),
        }
    }
}

/// Per-line oracle: is this (1-based) line a lazy continuation?
pub trait LazyLines {
    fn is_lazy(&self, line: usize) -> bool;
}

/// No line is ever lazy. The default for standalone documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLazyLines;

impl LazyLines for NoLazyLines {
    fn is_lazy(&self, _line: usize) -> bool {
        false
    }
}

impl LazyLines for BTreeSet<usize> {
    fn is_lazy(&self, line: usize) -> bool {
        self.contains(&line)
    }
}

impl LazyLines for HashSet<usize> {
    fn is_lazy(&self, line: usize) -> bool {
        self.contains(&line)
    }
}

impl<F> LazyLines for F
where
    F: Fn(usize) -> bool,
{
    fn is_lazy(&self, line: usize) -> bool {
        self(line)
    }
}

/// Everything the parser is told about its surroundings.
pub struct ParseOptions<'a> {
    pub constructs: Constructs,
    pub lazy: &'a dyn LazyLines,
}

impl<'a> ParseOptions<'a> {
    pub fn new(constructs: Constructs, lazy: &'a dyn LazyLines) -> Self {
        Self { constructs, lazy }
    }
}

impl Default for ParseOptions<'_> {
    fn default() -> Self {
        Self {
            constructs: Constructs::default(),
            lazy: &NoLazyLines,
        }
    }
}

impl fmt::Debug for ParseOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("constructs", &self.constructs)
            .finish_non_exhaustive()
    }
}
