//! # Error Types
//!
//! Per-call errors surfaced to the caller of a validation request. Schema
//! violations are deliberately absent: an invalid document is a normal
//! outcome, not an error.

use thiserror::Error;

/// Top-level error for a single validation request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DyncfgError {
    /// The configuration text could not be parsed.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// The kind selector is not one of the known configuration kinds.
    #[error("{0}")]
    UnknownKind(#[from] UnknownKindError),
}

/// Configuration text is not well-formed under the accepted grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {message}")]
pub struct SyntaxError {
    /// 1-based line of the offending character.
    pub line: usize,
    /// 1-based column (in characters) of the offending character.
    pub column: usize,
    /// What the parser expected or rejected.
    pub message: String,
}

impl SyntaxError {
    /// Create a syntax error at a position.
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// A kind selector outside the closed set of configuration kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown configuration kind '{selector}' (expected one of: security, variable, table)")]
pub struct UnknownKindError {
    /// The selector as supplied by the caller.
    pub selector: String,
}
