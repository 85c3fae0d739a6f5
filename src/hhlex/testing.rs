//! Testing utilities for lexer output
//!
//! Two tools, used together:
//!
//! 1. **[assert_tokens]**, a fluent assertion API over the tokens of a line. Failures
//!    name the token index, its value and its full scope stack, so a broken expectation
//!    reads like a diff of the lexer output.
//!
//!    ```rust-example
//!    let (tokens, _) = lexer.tokenize_line("$test <<= 2;", &state);
//!    assert_tokens(&tokens)
//!        .values(&["$", "test", " ", "<<=", " ", "2", ";"])
//!        .token(3, |t| t.leaf(Scope::AssignmentOperator));
//!    ```
//!
//! 2. **[SyntaxTest]**, golden fixtures in the syntax-test convention. Source lines are
//!    followed by assertion lines that point at columns with `^` (or `<-` for the column
//!    of the comment token) and list the scopes expected there:
//!
//!    ```text
//!    // SYNTAX TEST "text.html.hack"
//!    <?hh $x = 1;
//!    //   ^ punctuation.definition.variable.php
//!    //         ^ punctuation.terminator.expression.php -variable.other.php
//!    ```
//!
//!    A scope prefixed with `-` must be absent. Header and assertion lines are not lexed;
//!    the remaining lines form the document under test.

mod token_assertions;

pub use syntax_test::{AssertionFailure, FixtureError, SyntaxTest, SyntaxTestReport};
pub use token_assertions::{assert_tokens, TokenAssertion, TokensAssertion};
