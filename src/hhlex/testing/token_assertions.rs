//! Fluent assertion API for lexer tokens

use crate::hhlex::scope::Scope;
use crate::hhlex::token::{detokenize, Token};

/// Create an assertion builder for the tokens of one line
pub fn assert_tokens(tokens: &[Token]) -> TokensAssertion<'_> {
    TokensAssertion { tokens }
}

pub struct TokensAssertion<'a> {
    tokens: &'a [Token],
}

impl<'a> TokensAssertion<'a> {
    /// Assert the number of tokens
    pub fn count(self, expected: usize) -> Self {
        assert_eq!(
            self.tokens.len(),
            expected,
            "Expected {} tokens, found {}: [{}]",
            expected,
            self.tokens.len(),
            summarize(self.tokens)
        );
        self
    }

    /// Assert the token values, in order
    pub fn values(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(
            actual, expected,
            "Token values differ: [{}]",
            summarize(self.tokens)
        );
        self
    }

    /// Assert the tokens concatenate back to `line`
    pub fn reproduces(self, line: &str) -> Self {
        assert_eq!(
            detokenize(self.tokens),
            line,
            "Tokens do not reproduce the line: [{}]",
            summarize(self.tokens)
        );
        self
    }

    /// Assert on a specific token by index
    pub fn token<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(TokenAssertion<'a>),
    {
        assert!(
            index < self.tokens.len(),
            "Token index {} out of bounds (line has {} tokens: [{}])",
            index,
            self.tokens.len(),
            summarize(self.tokens)
        );
        assertion(TokenAssertion {
            token: &self.tokens[index],
            context: format!("tokens[{}]", index),
        });
        self
    }

    /// Assert on the first token with the given value
    pub fn token_with_value<F>(self, value: &str, assertion: F) -> Self
    where
        F: FnOnce(TokenAssertion<'a>),
    {
        let Some(index) = self.tokens.iter().position(|t| t.value == value) else {
            panic!(
                "No token with value {:?}: [{}]",
                value,
                summarize(self.tokens)
            );
        };
        assertion(TokenAssertion {
            token: &self.tokens[index],
            context: format!("tokens[{}] ({:?})", index, value),
        });
        self
    }

    /// Assert every token carries `scope`
    pub fn all_have(self, scope: Scope) -> Self {
        if let Some((index, token)) = self
            .tokens
            .iter()
            .enumerate()
            .find(|(_, t)| !t.has_scope(scope))
        {
            panic!(
                "Expected every token to have {}, tokens[{}] {} does not",
                scope, index, token
            );
        }
        self
    }
}

pub struct TokenAssertion<'a> {
    token: &'a Token,
    context: String,
}

impl<'a> TokenAssertion<'a> {
    pub fn value(self, expected: &str) -> Self {
        assert_eq!(
            self.token.value, expected,
            "{}: expected value {:?}, found {}",
            self.context, expected, self.token
        );
        self
    }

    /// Assert the token's scope stack contains `scope`
    pub fn has(self, scope: Scope) -> Self {
        assert!(
            self.token.has_scope(scope),
            "{}: expected scope {}, found {}",
            self.context,
            scope,
            self.token
        );
        self
    }

    /// Assert the token's scope stack does not contain `scope`
    pub fn lacks(self, scope: Scope) -> Self {
        assert!(
            !self.token.has_scope(scope),
            "{}: expected no {}, found {}",
            self.context,
            scope,
            self.token
        );
        self
    }

    /// Assert the innermost scope
    pub fn leaf(self, scope: Scope) -> Self {
        assert_eq!(
            self.token.scopes.innermost(),
            scope,
            "{}: expected innermost scope {}, found {}",
            self.context,
            scope,
            self.token
        );
        self
    }

    /// Assert the full scope stack
    pub fn scopes(self, expected: &[Scope]) -> Self {
        assert_eq!(
            self.token.scopes.as_slice(),
            expected,
            "{}: scope stack differs for {}",
            self.context,
            self.token
        );
        self
    }

    pub fn columns(self, start: usize, end: usize) -> Self {
        assert_eq!(
            (self.token.start_column, self.token.end_column),
            (start, end),
            "{}: expected columns {}..{}, found {}",
            self.context,
            start,
            end,
            self.token
        );
        self
    }
}

fn summarize(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| format!("{:?}", t.value))
        .collect::<Vec<_>>()
        .join(", ")
}
