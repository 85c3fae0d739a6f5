//! Main module for hhlex library functionality

pub mod config;
pub mod diagnostics;
pub mod document;
pub mod formats;
pub mod grammar;
pub mod lexing;
pub mod provider;
pub mod scope;
pub mod selector;
pub mod testing;
pub mod token;

pub use diagnostics::{Diagnostic, DiagnosticKind, Position, Range, Severity};
pub use document::TokenizedDocument;
pub use grammar::{Grammar, GrammarError};
pub use lexing::{Lexer, LexerState, LineTokens};
pub use scope::{Scope, ScopeStack};
pub use token::Token;
