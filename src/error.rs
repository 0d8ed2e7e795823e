//! Error types
//!
//! Two levels of failure exist:
//!
//! - [`Failure`] is what combinators return. It only carries the cursor
//!   position, because failing is the normal way backtracking works and
//!   happens constantly during a parse.
//! - [`ParseFailure`] is the diagnostic handed to callers once a whole parse
//!   failed: position, 1-based line and column, and the surrounding text.
//!
//! [`GrammarError`] covers everything that can go wrong while compiling a
//! grammar description, including syntax errors in the grammar text itself.

use crate::location::{ceil_char_boundary, floor_char_boundary, SourceLocation};
use std::fmt;

/// Bytes of context shown on each side of a failure.
const CONTEXT_RADIUS: usize = 25;

/// A combinator-level parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure {
    pub position: usize,
}

impl Failure {
    pub fn at(position: usize) -> Self {
        Self { position }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no match at offset {}", self.position)
    }
}

impl std::error::Error for Failure {}

/// Result of running a parser.
pub type ParseResult = Result<crate::value::Value, Failure>;

/// A failed parse, located in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Byte offset of the failure.
    pub position: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, in characters.
    pub column: usize,
    /// Input text around the failure.
    pub context: String,
}

impl ParseFailure {
    /// Locate a failure at byte `position` of `input`.
    pub fn at(input: &str, position: usize) -> Self {
        let position = floor_char_boundary(input, position);
        let location = SourceLocation::new(input).position_of(position);
        let start = floor_char_boundary(input, position.saturating_sub(CONTEXT_RADIUS));
        let end = ceil_char_boundary(input, position.saturating_add(CONTEXT_RADIUS));

        Self {
            position,
            line: location.line,
            column: location.column,
            context: input[start..end].to_string(),
        }
    }

    /// Shift the failure onto another line, for failures computed on a slice
    /// of a larger text.
    pub(crate) fn relocate(mut self, position: usize, line: usize, column_offset: usize) -> Self {
        self.position = position;
        if self.line == 1 {
            self.column += column_offset;
        }
        self.line += line - 1;
        self
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at {}:{}, near: {}",
            self.line, self.column, self.context
        )
    }
}

impl std::error::Error for ParseFailure {}

/// Errors raised while compiling a grammar description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// The grammar text does not follow the grammar notation.
    Syntax(ParseFailure),
    /// A `#"..."` component is not a valid regular expression.
    InvalidRegex {
        rule: String,
        pattern: String,
        message: String,
    },
    /// The same rule name is declared twice. Later declarations never
    /// replace earlier ones.
    DuplicateRule(String),
    /// A rule AST does not have the shape the bootstrap parser produces.
    Malformed(String),
    /// The grammar text contains no rule.
    Empty,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::Syntax(failure) => write!(f, "Invalid grammar: {}", failure),
            GrammarError::InvalidRegex {
                rule,
                pattern,
                message,
            } => write!(
                f,
                "Invalid regular expression #\"{}\" in rule '{}': {}",
                pattern, rule, message
            ),
            GrammarError::DuplicateRule(name) => {
                write!(f, "Rule '{}' is declared more than once", name)
            }
            GrammarError::Malformed(msg) => write!(f, "Malformed grammar tree: {}", msg),
            GrammarError::Empty => write!(f, "Grammar declares no rules"),
        }
    }
}

impl std::error::Error for GrammarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GrammarError::Syntax(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<ParseFailure> for GrammarError {
    fn from(failure: ParseFailure) -> Self {
        GrammarError::Syntax(failure)
    }
}
