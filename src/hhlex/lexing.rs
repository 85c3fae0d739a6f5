//! Lexing
//!
//!     Lexing happens one line at a time. The raw tokens inside embedded code come from a
//!     logos lexer ([raw]); the line scanner ([lexer]) drives the mode and context state
//!     machine ([state]) and decides the scopes of each token.
//!
//!     The output of a line depends only on the line text and the [LexerState] the previous
//!     line ended in:
//!
//!         let (tokens, next) = lexer.tokenize_line("$test = 2;", &state);
//!
//!     The lexer holds no mutable state, so one lexer can serve many documents at once.

pub mod lexer;
pub mod raw;
pub mod state;

pub use lexer::{Lexer, LineTokens};
pub use raw::RawToken;
pub use state::{
    ArrayKind, Context, FunctionPhase, HeredocKind, LexerState, Mode, ParameterKind, Quote,
};
