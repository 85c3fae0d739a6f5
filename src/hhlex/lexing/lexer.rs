//! The line scanner
//!
//!     [Lexer::tokenize_line] walks one line from left to right. At each position the
//!     current mode and innermost context pick a scanner:
//!
//!         markup mode            text up to the next open tag
//!         heredoc / nowdoc       body text, interpolation, the terminator line
//!         string literal         text, escapes, interpolation, the closing quote
//!         block comment          text up to `*/`
//!         anything else          one raw token (logos), dispatched by kind
//!
//!     Every byte of the line ends up in exactly one token, so the token values of a line
//!     always concatenate back to the line. Input no rule matches becomes a one-character
//!     token plus an `UnrecognizedCharacter` diagnostic.
//!
//! Function headers
//!
//!     A `function` keyword opens a header context that follows the declaration through its
//!     phases (name, parameters, return type, closure `use`). While the header is the
//!     innermost context, each code token is first offered to the header. A token that
//!     cannot continue the header closes it and is scanned again in the enclosing context,
//!     which is how `(function(): bool)` gets its `)` back.

use super::raw::{is_identifier_char, is_identifier_start, next_raw, RawToken};
use super::state::{
    ArrayKind, Context, FunctionPhase, HeredocKind, LexerState, Mode, ParameterKind, Quote,
};
use crate::hhlex::diagnostics::{ConstructKind, Diagnostic, Position, Range};
use crate::hhlex::grammar::{Grammar, RuleSet};
use crate::hhlex::scope::{Scope, ScopeStack};
use crate::hhlex::token::Token;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Tokens, exit state and diagnostics for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTokens {
    pub tokens: Vec<Token>,
    pub state: LexerState,
    pub diagnostics: Vec<Diagnostic>,
}

/// Line-at-a-time lexer for Hack embedded in HTML.
///
/// The lexer itself is immutable; all state is passed in and returned explicitly.
#[derive(Debug, Clone)]
pub struct Lexer {
    grammar: Arc<Grammar>,
}

impl Lexer {
    pub fn new(grammar: Arc<Grammar>) -> Self {
        Lexer { grammar }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The state at the start of a document.
    pub fn initial_state(&self) -> LexerState {
        LexerState::new()
    }

    pub fn tokenize_line(&self, line: &str, state: &LexerState) -> (Vec<Token>, LexerState) {
        let result = self.tokenize_line_with_diagnostics(line, state);
        (result.tokens, result.state)
    }

    pub fn tokenize_line_with_diagnostics(&self, line: &str, state: &LexerState) -> LineTokens {
        LineScanner::new(&self.grammar, line, state.clone()).run()
    }

    /// Tokenizes a whole text, one token list per `\n`-separated line.
    pub fn tokenize_lines(&self, text: &str) -> Vec<Vec<Token>> {
        let mut state = self.initial_state();
        text.split('\n')
            .map(|line| {
                let (tokens, next) = self.tokenize_line(line, &state);
                state = next;
                tokens
            })
            .collect()
    }

    /// Reports everything still open in `state` at the end of a document.
    ///
    /// The embedded block comes first, then contexts from outermost to innermost. All
    /// diagnostics point at `end`.
    pub fn finish(&self, state: &LexerState, end: Position) -> Vec<Diagnostic> {
        let range = Range::new(end, end);
        let mut diagnostics = Vec::new();
        if state.is_embedded() {
            diagnostics.push(Diagnostic::unterminated(ConstructKind::EmbeddedBlock, range));
        }
        diagnostics.extend(
            state
                .contexts
                .iter()
                .map(|context| Diagnostic::unterminated(context.construct(), range)),
        );
        if !state.contexts.is_empty() {
            warn!(
                open = state.contexts.len(),
                "document ends with unterminated constructs"
            );
        }
        diagnostics
    }
}

/// Outcome of offering a token to an open function header.
enum HeaderStep {
    /// The header emitted the token.
    Consumed,
    /// The header closed; scan the token again.
    Popped,
    /// The header stays open; handle the token normally.
    Fallthrough,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Closer {
    Paren,
    Bracket,
    Brace,
}

/// One-token lookbehind hints, consumed by the next significant token.
#[derive(Default, Clone, Copy)]
struct Pending {
    array_paren: bool,
    class_name: bool,
}

struct LineScanner<'a> {
    grammar: &'a Grammar,
    line: &'a str,
    pos: usize,
    column: usize,
    state: LexerState,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    pending: Pending,
    prev_value: bool,
    after_member: bool,
}

impl<'a> LineScanner<'a> {
    fn new(grammar: &'a Grammar, line: &'a str, state: LexerState) -> Self {
        LineScanner {
            grammar,
            line,
            pos: 0,
            column: 0,
            state,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            pending: Pending::default(),
            prev_value: false,
            after_member: false,
        }
    }

    fn run(mut self) -> LineTokens {
        while self.pos < self.line.len() {
            if !self.state.is_embedded() {
                self.scan_markup();
                continue;
            }
            match self.state.top().cloned() {
                Some(Context::Heredoc { tag, kind }) => self.scan_heredoc(&tag, kind),
                Some(Context::Str(quote)) => self.scan_string(quote),
                Some(Context::BlockComment) => self.scan_block_comment(),
                _ => self.scan_code(),
            }
        }
        LineTokens {
            tokens: self.tokens,
            state: self.state,
            diagnostics: self.diagnostics,
        }
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn emit(&mut self, len: usize, leaves: &[Scope]) {
        let scopes = self.state.scope_stack(self.grammar).with(leaves);
        self.emit_with_stack(len, scopes);
    }

    fn emit_with_stack(&mut self, len: usize, scopes: ScopeStack) {
        if len == 0 {
            return;
        }
        let value = &self.line[self.pos..self.pos + len];
        let token = Token::new(value, scopes, self.column);
        trace!(%token, "emit");
        self.column = token.end_column;
        self.pos += len;
        self.tokens.push(token);
    }

    fn set_top(&mut self, context: Context) {
        if let Some(top) = self.state.top_mut() {
            *top = context;
        }
    }

    // Markup

    fn scan_markup(&mut self) {
        let rest = self.rest();
        match self.find_open_tag(rest) {
            Some((offset, len)) => {
                self.emit(offset, &[]);
                let stack = ScopeStack::new(self.grammar.root)
                    .with(&[Scope::EmbeddedBlock, Scope::EmbeddedBegin]);
                self.emit_with_stack(len, stack);
                self.state.mode = Mode::Embedded;
                self.prev_value = false;
                debug!(column = self.column, "enter embedded mode");
            }
            None => self.emit(rest.len(), &[]),
        }
    }

    /// Offset and length of the first open tag in `text`, preferring the longest tag.
    fn find_open_tag(&self, text: &str) -> Option<(usize, usize)> {
        text.match_indices("<?").find_map(|(offset, _)| {
            let candidate = &text[offset..];
            self.grammar
                .open_tags
                .iter()
                .filter(|tag| {
                    candidate
                        .get(..tag.len())
                        .is_some_and(|head| head.eq_ignore_ascii_case(tag))
                        && !continues_word(tag, &candidate[tag.len()..])
                })
                .map(|tag| tag.len())
                .max()
                .map(|len| (offset, len))
        })
    }

    // Embedded code

    fn scan_code(&mut self) {
        let rest = self.rest();
        let Some((kind, len)) = next_raw(rest) else {
            self.unrecognized();
            return;
        };
        let text = &rest[..len];

        if kind.is_trivia() {
            self.scan_trivia(kind, len);
            return;
        }

        let pending = std::mem::take(&mut self.pending);
        let after_member = std::mem::replace(&mut self.after_member, false);

        if self.state.top().is_some_and(Context::is_header) {
            match self.scan_header(kind, text) {
                HeaderStep::Consumed => {
                    self.prev_value = matches!(kind, RawToken::Identifier | RawToken::CloseParen);
                    return;
                }
                HeaderStep::Popped => {
                    self.pending = pending;
                    self.after_member = after_member;
                    return;
                }
                HeaderStep::Fallthrough => {}
            }
        }

        let mut value = kind.is_value();
        match kind {
            RawToken::HeredocStart => self.open_heredoc(text),
            RawToken::Variable => {
                self.emit(1, &[Scope::Variable, Scope::VariablePunctuation]);
                self.emit(len - 1, &[Scope::Variable]);
            }
            RawToken::Dollar => self.emit(1, &[Scope::Variable, Scope::VariablePunctuation]),
            RawToken::Identifier => value = self.scan_identifier(text, pending, after_member),
            RawToken::Number => self.emit(len, &[Scope::Numeric]),
            RawToken::SingleQuote => self.open_string(Quote::Single),
            RawToken::DoubleQuote => self.open_string(Quote::Double),
            RawToken::OpenParen => {
                if pending.array_paren {
                    self.emit(len, &[Scope::ArrayBegin]);
                    self.state.push(Context::ArrayLiteral(ArrayKind::Legacy));
                } else {
                    self.emit(len, &[]);
                    self.state.push(Context::Group);
                }
            }
            RawToken::OpenBracket => {
                if self.prev_value {
                    self.emit(len, &[]);
                    self.state.push(Context::Subscript);
                } else {
                    self.emit(len, &[Scope::ShortArrayBegin]);
                    self.state.push(Context::ArrayLiteral(ArrayKind::Short));
                }
            }
            RawToken::OpenBrace => {
                if self.state.top() == Some(&Context::Namespace) {
                    self.state.pop();
                }
                self.emit(len, &[Scope::ScopeBegin]);
                self.state.push(Context::Block);
            }
            RawToken::CloseParen => self.close(Closer::Paren, len),
            RawToken::CloseBracket => self.close(Closer::Bracket, len),
            RawToken::CloseBrace => self.close(Closer::Brace, len),
            RawToken::Semicolon => {
                if self.state.top() == Some(&Context::Namespace) {
                    self.state.pop();
                }
                self.emit(len, &[Scope::Terminator]);
            }
            RawToken::Comma => {
                if matches!(self.state.top(), Some(Context::Parameter(_))) {
                    self.state.pop();
                }
                self.emit(len, &[]);
            }
            RawToken::Backslash => {
                if self.state.top() == Some(&Context::Namespace) {
                    self.emit(len, &[Scope::NamespaceName]);
                } else {
                    self.emit(len, &[]);
                }
            }
            RawToken::Operator => {
                let short_default = text == "="
                    && self.state.top() == Some(&Context::Parameter(ParameterKind::Short));
                if short_default {
                    self.emit(len, &[]);
                } else {
                    match self.grammar.operator_scope(text) {
                        Some(scope) => self.emit(len, &[scope]),
                        None => self.emit(len, &[]),
                    }
                }
                self.after_member = matches!(text, "->" | "?->" | "::");
            }
            RawToken::Whitespace
            | RawToken::LineComment
            | RawToken::HashComment
            | RawToken::BlockCommentStart
            | RawToken::CloseTag => {}
        }
        self.prev_value = value;
    }

    fn scan_trivia(&mut self, kind: RawToken, len: usize) {
        match kind {
            RawToken::Whitespace => {
                let after = &self.rest()[len..];
                if self.state.contexts.is_empty() && starts_namespace_declaration(after) {
                    self.state.push(Context::Namespace);
                }
                self.emit(len, &[]);
            }
            RawToken::CloseTag => {
                let stack = ScopeStack::new(self.grammar.root)
                    .with(&[Scope::EmbeddedBlock, Scope::EmbeddedEnd]);
                self.emit_with_stack(len, stack);
                self.state.mode = Mode::Markup;
                debug!(column = self.column, "leave embedded mode");
            }
            RawToken::LineComment => self.scan_line_comment(len, Scope::LineCommentDoubleSlash),
            RawToken::HashComment => self.scan_line_comment(len, Scope::LineCommentNumberSign),
            RawToken::BlockCommentStart => {
                self.state.push(Context::BlockComment);
                self.emit(len, &[Scope::CommentPunctuation]);
            }
            _ => self.emit(len, &[]),
        }
    }

    /// Returns whether the identifier ends a value.
    fn scan_identifier(&mut self, word: &str, pending: Pending, after_member: bool) -> bool {
        let len = word.len();
        if after_member {
            self.emit(len, &[]);
            return true;
        }
        let after = &self.rest()[len..];
        match word {
            "function" => {
                let next = after.trim_start_matches([' ', '\t', '&']).chars().next();
                let context = if next == Some('(') {
                    Context::Closure(FunctionPhase::Keyword)
                } else {
                    Context::Function(FunctionPhase::Keyword)
                };
                self.state.push(context);
                self.emit(len, &[Scope::FunctionStorage]);
                false
            }
            "namespace" if followed_by_space(after) => {
                if self.state.top() != Some(&Context::Namespace) {
                    self.state.push(Context::Namespace);
                }
                self.emit(len, &[Scope::NamespaceKeyword]);
                false
            }
            "array" => {
                if after.trim_start().starts_with('(') {
                    self.pending.array_paren = true;
                    self.emit(len, &[Scope::Construct]);
                } else if self.state.top() == Some(&Context::ParamList) {
                    self.state.push(Context::Parameter(parameter_kind(after)));
                    self.emit(len, &[Scope::StorageType]);
                } else {
                    self.emit(len, &[Scope::StorageType]);
                }
                false
            }
            _ if self.state.top() == Some(&Context::Namespace) => {
                self.emit(len, &[Scope::NamespaceName]);
                false
            }
            _ if pending.class_name => {
                self.emit(len, &[Scope::ClassName]);
                true
            }
            _ => match self.grammar.keyword_scope(word) {
                Some(Scope::ClassStorage) => {
                    self.pending.class_name = true;
                    self.emit(len, &[Scope::ClassStorage]);
                    false
                }
                Some(Scope::LanguageConstant) => {
                    self.emit(len, &[Scope::LanguageConstant]);
                    true
                }
                Some(scope) => {
                    self.emit(len, &[scope]);
                    false
                }
                None => {
                    self.emit(len, &[]);
                    true
                }
            },
        }
    }

    fn scan_header(&mut self, kind: RawToken, text: &str) -> HeaderStep {
        let (is_closure, phase) = match self.state.top() {
            Some(Context::Function(phase)) => (false, *phase),
            Some(Context::Closure(phase)) => (true, *phase),
            _ => return HeaderStep::Fallthrough,
        };
        let len = text.len();

        match (phase, kind) {
            (FunctionPhase::Keyword, RawToken::Operator) if text == "&" => {
                self.emit(len, &[]);
            }
            (FunctionPhase::Keyword, RawToken::Identifier) if !is_closure => {
                let leaf = if self.grammar.is_magic_method(text) {
                    Scope::MagicFunction
                } else {
                    Scope::FunctionName
                };
                self.emit(len, &[leaf]);
                self.set_top(Context::Function(FunctionPhase::Name));
            }
            (FunctionPhase::Keyword | FunctionPhase::Name, RawToken::OpenParen) => {
                // `function` followed by `(` on a later line is a closure after all
                let header = if is_closure || phase == FunctionPhase::Keyword {
                    Context::Closure(FunctionPhase::Params)
                } else {
                    Context::Function(FunctionPhase::Params)
                };
                self.set_top(header);
                self.emit(len, &[Scope::ParametersBegin]);
                self.state.push(Context::ParamList);
            }
            (FunctionPhase::AfterParams | FunctionPhase::Use, RawToken::Operator)
                if text == ":" =>
            {
                self.emit(len, &[]);
                self.set_top(header_context(
                    is_closure,
                    FunctionPhase::ReturnType { generics: 0 },
                ));
            }
            (FunctionPhase::AfterParams | FunctionPhase::ReturnType { .. }, RawToken::Identifier)
                if is_closure && text == "use" =>
            {
                self.emit(len, &[Scope::ClosureUse]);
                self.set_top(Context::Closure(FunctionPhase::Use));
            }
            (FunctionPhase::ReturnType { .. }, RawToken::Identifier) => {
                match self.grammar.keyword_scope(text) {
                    Some(scope) => self.emit(len, &[scope]),
                    None => self.emit(len, &[]),
                }
            }
            (FunctionPhase::ReturnType { generics }, RawToken::Operator)
                if matches!(text, "?" | "<" | ">" | ">>" | "@" | "~") =>
            {
                let generics = match text {
                    "<" => generics.saturating_add(1),
                    ">" => generics.saturating_sub(1),
                    ">>" => generics.saturating_sub(2),
                    _ => generics,
                };
                self.emit(len, &[]);
                self.set_top(header_context(
                    is_closure,
                    FunctionPhase::ReturnType { generics },
                ));
            }
            (FunctionPhase::ReturnType { generics }, RawToken::Comma) if generics > 0 => {
                self.emit(len, &[]);
            }
            (FunctionPhase::ReturnType { .. }, RawToken::Backslash) => {
                self.emit(len, &[]);
            }
            (FunctionPhase::ReturnType { .. } | FunctionPhase::Use, RawToken::OpenParen) => {
                return HeaderStep::Fallthrough;
            }
            (
                FunctionPhase::AfterParams | FunctionPhase::ReturnType { .. } | FunctionPhase::Use,
                RawToken::OpenBrace,
            ) if is_closure => {
                self.set_top(Context::Closure(FunctionPhase::Body));
                self.emit(len, &[Scope::ScopeBegin]);
            }
            _ => {
                self.state.pop();
                return HeaderStep::Popped;
            }
        }
        HeaderStep::Consumed
    }

    /// Closes the nearest matching opener, skipping over contexts that end implicitly.
    fn close(&mut self, closer: Closer, len: usize) {
        let opener = self
            .state
            .contexts
            .iter()
            .rposition(|context| !closes_implicitly(context));
        let matched = opener.filter(|index| matches_closer(&self.state.contexts[*index], closer));

        let Some(index) = matched else {
            // Unbalanced closer: emit it and leave the stack alone
            let leaves: &[Scope] = match closer {
                Closer::Brace => &[Scope::ScopeEnd],
                Closer::Paren | Closer::Bracket => &[],
            };
            self.emit(len, leaves);
            return;
        };

        while self.state.contexts.len() > index + 1 {
            self.state.pop();
        }
        match self.state.top().cloned() {
            Some(Context::Closure(FunctionPhase::Body)) => {
                self.emit(len, &[Scope::ScopeEnd]);
                self.state.pop();
            }
            Some(Context::ParamList) => {
                self.state.pop();
                let header = self.state.top().cloned();
                match header {
                    Some(Context::Function(FunctionPhase::Params)) => {
                        self.set_top(Context::Function(FunctionPhase::AfterParams))
                    }
                    Some(Context::Closure(FunctionPhase::Params)) => {
                        self.set_top(Context::Closure(FunctionPhase::AfterParams))
                    }
                    _ => {}
                }
                self.emit(len, &[Scope::ParametersEnd]);
            }
            Some(context) => {
                self.state.pop();
                let leaves: &[Scope] = match context {
                    Context::ArrayLiteral(ArrayKind::Legacy) => &[Scope::ArrayEnd],
                    Context::ArrayLiteral(ArrayKind::Short) => &[Scope::ShortArrayEnd],
                    Context::Block => &[Scope::ScopeEnd],
                    _ => &[],
                };
                self.emit(len, leaves);
            }
            None => self.emit(len, &[]),
        }
    }

    fn unrecognized(&mut self) {
        let Some(character) = self.rest().chars().next() else {
            return;
        };
        let start = Position::new(0, self.column);
        self.emit(character.len_utf8(), &[]);
        let end = Position::new(0, self.column);
        debug!(?character, column = start.column, "unrecognized character");
        self.diagnostics
            .push(Diagnostic::unrecognized(character, Range::new(start, end)));
    }

    // Comments

    fn scan_line_comment(&mut self, marker_len: usize, scope: Scope) {
        self.emit(marker_len, &[scope, Scope::CommentPunctuation]);
        let rest = self.rest();
        let body = rest.find(self.grammar.close_tag.as_str()).unwrap_or(rest.len());
        self.emit(body, &[scope]);
    }

    fn scan_block_comment(&mut self) {
        let rest = self.rest();
        let grammar = self.grammar;
        let end = grammar.block_comment.end().unwrap_or("*/");
        match rest.find(end) {
            Some(offset) => {
                self.emit(offset, &[]);
                self.emit(end.len(), &[Scope::CommentPunctuation]);
                self.state.pop();
            }
            None => self.emit(rest.len(), &[]),
        }
    }

    // Strings

    fn open_string(&mut self, quote: Quote) {
        self.state.push(Context::Str(quote));
        self.emit(1, &[Scope::StringBegin]);
    }

    fn scan_string(&mut self, quote: Quote) {
        let grammar = self.grammar;
        let rule = match quote {
            Quote::Single => &grammar.single_quoted,
            Quote::Double => &grammar.double_quoted,
        };
        let end = rule.end().unwrap_or(quote.delimiter());
        let escapes = rule.inside();
        if self.rest().starts_with(end) {
            self.emit(end.len(), &[Scope::StringEnd]);
            self.state.pop();
            self.prev_value = true;
            return;
        }
        self.scan_string_body(Some(end), escapes, quote == Quote::Double);
    }

    fn open_heredoc(&mut self, text: &str) {
        let after_marker = &text[3..];
        let tag_text = after_marker.trim_start_matches([' ', '\t']);
        let gap = after_marker.len() - tag_text.len();
        let kind = if tag_text.starts_with('\'') {
            HeredocKind::Nowdoc
        } else {
            HeredocKind::Heredoc
        };
        let tag = tag_text.trim_matches(['\'', '"']).to_string();
        let leaf = heredoc_operator(kind);
        self.state.push(Context::Heredoc { tag, kind });
        self.emit(3, &[leaf]);
        self.emit(gap, &[]);
        self.emit(tag_text.len(), &[leaf]);
    }

    fn scan_heredoc(&mut self, tag: &str, kind: HeredocKind) {
        if self.pos == 0 {
            if let Some(indent) = terminator_indent(self.line, tag) {
                self.emit(indent, &[]);
                self.emit(tag.len(), &[heredoc_operator(kind)]);
                self.state.pop();
                self.prev_value = true;
                return;
            }
        }
        match kind {
            HeredocKind::Heredoc => {
                let grammar = self.grammar;
                let escapes = Some(&grammar.heredoc_escapes);
                self.scan_string_body(None, escapes, true);
            }
            HeredocKind::Nowdoc => {
                let len = self.rest().len();
                self.emit(len, &[]);
            }
        }
    }

    /// Emits one piece of string content: a text run, an escape, or an interpolation.
    fn scan_string_body(&mut self, end: Option<&str>, escapes: Option<&RuleSet>, interpolate: bool) {
        let rest = self.rest();
        let text_len = string_text_len(rest, end, escapes, interpolate);
        if text_len > 0 {
            self.emit(text_len, &[]);
            return;
        }
        if let Some((len, scope)) = escapes.and_then(|rules| rules.match_at(rest)) {
            self.emit(len, &[scope]);
        } else if rest.starts_with("{$") {
            self.emit(1, &[]);
        } else if let Some(name) = rest.strip_prefix('$') {
            let name_len = identifier_len(name);
            self.emit(1, &[Scope::Variable, Scope::VariablePunctuation]);
            self.emit(name_len, &[Scope::Variable]);
        } else {
            // string_text_len only stops at the characters handled above
            let len = rest.chars().next().map_or(rest.len(), char::len_utf8);
            self.emit(len, &[]);
        }
    }
}

fn header_context(is_closure: bool, phase: FunctionPhase) -> Context {
    if is_closure {
        Context::Closure(phase)
    } else {
        Context::Function(phase)
    }
}

fn heredoc_operator(kind: HeredocKind) -> Scope {
    match kind {
        HeredocKind::Heredoc => Scope::HeredocOperator,
        HeredocKind::Nowdoc => Scope::NowdocOperator,
    }
}

/// Contexts a closing delimiter may close on its way to the matching opener.
fn closes_implicitly(context: &Context) -> bool {
    matches!(context, Context::Parameter(_) | Context::Namespace) || context.is_header()
}

fn matches_closer(context: &Context, closer: Closer) -> bool {
    match closer {
        Closer::Paren => matches!(
            context,
            Context::Group | Context::ParamList | Context::ArrayLiteral(ArrayKind::Legacy)
        ),
        Closer::Bracket => matches!(
            context,
            Context::Subscript | Context::ArrayLiteral(ArrayKind::Short)
        ),
        Closer::Brace => matches!(
            context,
            Context::Block | Context::Closure(FunctionPhase::Body)
        ),
    }
}

/// `namespace` keyword followed by whitespace or the end of the line.
fn starts_namespace_declaration(text: &str) -> bool {
    text.strip_prefix("namespace").is_some_and(followed_by_space)
}

fn followed_by_space(after: &str) -> bool {
    matches!(after.chars().next(), None | Some(' ' | '\t' | '\r'))
}

/// Whether a tag ending in an identifier character runs into more identifier characters.
fn continues_word(tag: &str, after: &str) -> bool {
    tag.chars().last().is_some_and(is_identifier_char)
        && after.chars().next().is_some_and(is_identifier_char)
}

/// Decides between a legacy and short array default by looking for `= [` in the parameter.
fn parameter_kind(after: &str) -> ParameterKind {
    let mut depth = 0usize;
    for (index, c) in after.char_indices() {
        match c {
            '(' | '[' | '<' => depth += 1,
            ')' | ']' | '>' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            ',' if depth == 0 => break,
            '=' if depth == 0 => {
                return if after[index + 1..].trim_start().starts_with('[') {
                    ParameterKind::Short
                } else {
                    ParameterKind::Legacy
                };
            }
            _ => {}
        }
    }
    ParameterKind::Legacy
}

/// Indentation before `tag` if `line` terminates a heredoc with that tag.
fn terminator_indent(line: &str, tag: &str) -> Option<usize> {
    let trimmed = line.trim_start_matches([' ', '\t']);
    let indent = line.len() - trimmed.len();
    let after = trimmed.strip_prefix(tag)?;
    match after.chars().next() {
        Some(c) if is_identifier_char(c) => None,
        _ => Some(indent),
    }
}

fn identifier_len(text: &str) -> usize {
    match text.chars().next() {
        Some(c) if is_identifier_start(c) => text
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(text.len()),
        _ => 0,
    }
}

/// Length of plain string content before the next delimiter, escape or interpolation.
fn string_text_len(
    text: &str,
    end: Option<&str>,
    escapes: Option<&RuleSet>,
    interpolate: bool,
) -> usize {
    for (index, c) in text.char_indices() {
        let here = &text[index..];
        if end.is_some_and(|end| here.starts_with(end)) {
            return index;
        }
        let stops = match c {
            '\\' => escapes.is_some_and(|rules| rules.match_at(here).is_some()),
            '$' => interpolate && identifier_len(&here[1..]) > 0,
            '{' => interpolate && here[1..].starts_with('$') && identifier_len(&here[2..]) > 0,
            _ => false,
        };
        if stops {
            return index;
        }
    }
    text.len()
}
