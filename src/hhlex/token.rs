//! Scoped tokens produced by the lexer
//!
//!     A [Token] is the unit of lexer output: an exact substring of the line it came from,
//!     the columns it spans, and the full scope stack active at that point. Tokens are
//!     immutable once produced. Concatenating the values of all tokens of a line gives back
//!     the line, which is what makes the output usable for highlighting.
//!
//!     Columns count Unicode scalar values from the start of the line and the end column is
//!     exclusive, so `end_column - start_column == value.chars().count()`.

use super::scope::{Scope, ScopeStack};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub value: String,
    pub scopes: ScopeStack,
    pub start_column: usize,
    pub end_column: usize,
}

impl Token {
    pub fn new(value: impl Into<String>, scopes: ScopeStack, start_column: usize) -> Self {
        let value = value.into();
        let end_column = start_column + value.chars().count();
        Token {
            value,
            scopes,
            start_column,
            end_column,
        }
    }

    /// Whether `scope` appears anywhere in the token's stack.
    pub fn has_scope(&self, scope: Scope) -> bool {
        self.scopes.contains(&scope)
    }

    /// Whether the half-open column range of this token contains `column`.
    pub fn contains_column(&self, column: usize) -> bool {
        self.start_column <= column && column < self.end_column
    }

    pub fn is_whitespace(&self) -> bool {
        !self.value.is_empty() && self.value.chars().all(char::is_whitespace)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} [{}..{}] {}",
            self.value, self.start_column, self.end_column, self.scopes
        )
    }
}

/// Joins the values of `tokens` back into the source text of a line.
pub fn detokenize(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.value.as_str()).collect()
}
