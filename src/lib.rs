//! # hhlex
//!
//! A line-oriented lexer for Hack (and PHP) code embedded in HTML documents.
//!
//! The lexer turns each line into scoped tokens in the style of editor grammars: every
//! token carries the full stack of scope names active at its position, from
//! `text.html.hack` down to the token's own classification. State is carried across
//! lines explicitly, so a document can be re-lexed from any edited line.
//!
//! ## Testing
//!
//! Golden fixtures use the syntax-test format, see the [testing module](hhlex::testing).

pub mod hhlex;
