//! Raw tokens for embedded code
//!
//! This module defines the character-level tokens recognized inside embedded code, using
//! the logos derive macro. Logos always takes the longest match, so compound operators like
//! `<<=` come out as a single token and never as `<<` followed by `=`.
//!
//! Raw tokens carry no scope. The line scanner decides scopes from the token kind, the
//! grammar tables and the current lexical context.
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawToken {
    #[regex(r"[ \t\r\x0C]+")]
    Whitespace,

    // Mode switch
    #[token("?>")]
    CloseTag,

    // Comments
    #[token("//")]
    LineComment,
    #[token("#")]
    HashComment,
    #[token("/*")]
    BlockCommentStart,

    // Heredoc / nowdoc start, tag included
    #[regex(r#"<<<[ \t]*("[A-Za-z_][A-Za-z0-9_]*"|'[A-Za-z_][A-Za-z0-9_]*'|[A-Za-z_][A-Za-z0-9_]*)"#)]
    HeredocStart,

    // Variables: `$name`, split into two tokens by the scanner
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    Variable,
    #[token("$")]
    Dollar,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    #[regex(r"0[xX][0-9A-Fa-f_]*")]
    #[regex(r"0[bB][01_]*")]
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    Number,

    #[token("'")]
    SingleQuote,
    #[token("\"")]
    DoubleQuote,

    // Punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("\\")]
    Backslash,

    // Operators, classified through the grammar's operator table
    #[token("<<=")]
    #[token(">>=")]
    #[token("**=")]
    #[token("??=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token(".=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("===")]
    #[token("!==")]
    #[token("<=>")]
    #[token("==>")]
    #[token("==")]
    #[token("!=")]
    #[token("<>")]
    #[token("<=")]
    #[token(">=")]
    #[token("...")]
    #[token("?->")]
    #[token("->")]
    #[token("::")]
    #[token("=>")]
    #[token("??")]
    #[token("|>")]
    #[token("&&")]
    #[token("||")]
    #[token("++")]
    #[token("--")]
    #[token("**")]
    #[token("<<")]
    #[token(">>")]
    #[token("=")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token(".")]
    #[token("<")]
    #[token(">")]
    #[token("!")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("~")]
    #[token("?")]
    #[token(":")]
    #[token("@")]
    Operator,
}

impl RawToken {
    /// Whether the token can end an expression, which makes a following `[` a subscript.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            RawToken::Variable
                | RawToken::Identifier
                | RawToken::Number
                | RawToken::CloseParen
                | RawToken::CloseBracket
                | RawToken::CloseBrace
        )
    }

    /// Whitespace, comment openers and the close tag: tokens handled outside any header.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            RawToken::Whitespace
                | RawToken::LineComment
                | RawToken::HashComment
                | RawToken::BlockCommentStart
                | RawToken::CloseTag
        )
    }
}

/// Lexes the single raw token at the start of `text`.
///
/// Returns the kind and its length in bytes, or `None` for input no rule matches (and for
/// empty input).
pub fn next_raw(text: &str) -> Option<(RawToken, usize)> {
    let mut lexer = RawToken::lexer(text);
    match lexer.next() {
        Some(Ok(kind)) => Some((kind, lexer.span().end)),
        _ => None,
    }
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
