//! Lexer state carried across line boundaries
//!
//!     Tokenizing a line only needs the text of the line and the [LexerState] the previous
//!     line ended in. The state is a plain value: the current [Mode] and the stack of open
//!     lexical [Context]s, innermost last. Two states compare equal exactly when lexing any
//!     following text from them gives the same result, which is what incremental re-lexing
//!     relies on to know when it can stop.
//!
//! Contexts and scopes
//!
//!     Some contexts contribute a scope to every token emitted while they are open (a
//!     function header contributes `meta.function.php`), others only track nesting so the
//!     right delimiter closes the right construct (`Group`, `Block`, arrays and subscripts).

use super::super::diagnostics::ConstructKind;
use super::super::grammar::Grammar;
use super::super::scope::{Scope, ScopeStack};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Host markup outside `<?hh ... ?>`.
    #[default]
    Markup,
    /// Inside an embedded code block.
    Embedded,
}

/// Progress through a function or closure header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionPhase {
    /// After the `function` keyword.
    Keyword,
    /// After the function name.
    Name,
    /// Inside the parameter list.
    Params,
    AfterParams,
    /// Inside a return type annotation; `generics` counts open `<`.
    ReturnType { generics: u8 },
    /// After a closure's `use`.
    Use,
    /// Inside a closure body.
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// `array` type hint with a non-`[` default.
    Legacy,
    /// `array` type hint with a `[` default.
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayKind {
    /// `array(...)`
    Legacy,
    /// `[...]`
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeredocKind {
    Heredoc,
    Nowdoc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn delimiter(self) -> &'static str {
        match self {
            Quote::Single => "'",
            Quote::Double => "\"",
        }
    }
}

/// An open lexical construct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Context {
    Namespace,
    Function(FunctionPhase),
    Closure(FunctionPhase),
    ParamList,
    Parameter(ParameterKind),
    ArrayLiteral(ArrayKind),
    Subscript,
    Group,
    Block,
    Heredoc { tag: String, kind: HeredocKind },
    Str(Quote),
    BlockComment,
}

impl Context {
    /// The scope this context adds to every token emitted inside it.
    pub fn scope(&self) -> Option<Scope> {
        match self {
            Context::Namespace => Some(Scope::Namespace),
            Context::Function(_) => Some(Scope::Function),
            Context::Closure(_) => Some(Scope::Closure),
            Context::ParamList => Some(Scope::Arguments),
            Context::Parameter(ParameterKind::Legacy) => Some(Scope::ArgumentArray),
            Context::Parameter(ParameterKind::Short) => Some(Scope::ArgumentShortArray),
            Context::Heredoc {
                kind: HeredocKind::Heredoc,
                ..
            } => Some(Scope::Heredoc),
            Context::Heredoc {
                kind: HeredocKind::Nowdoc,
                ..
            } => Some(Scope::Nowdoc),
            Context::Str(Quote::Single) => Some(Scope::SingleQuotedString),
            Context::Str(Quote::Double) => Some(Scope::DoubleQuotedString),
            Context::BlockComment => Some(Scope::BlockComment),
            Context::ArrayLiteral(_) | Context::Subscript | Context::Group | Context::Block => {
                None
            }
        }
    }

    /// Whether `self` and `other` are the same open construct at different points of its
    /// life. Header phases advance while a function is lexed, and a `function` keyword
    /// becomes a closure once its `(` is seen.
    pub fn same_construct(&self, other: &Context) -> bool {
        match (self, other) {
            (
                Context::Function(_) | Context::Closure(_),
                Context::Function(_) | Context::Closure(_),
            ) => true,
            _ => self == other,
        }
    }

    pub fn construct(&self) -> ConstructKind {
        match self {
            Context::Namespace => ConstructKind::Namespace,
            Context::Function(_) => ConstructKind::FunctionHeader,
            Context::Closure(_) => ConstructKind::Closure,
            Context::ParamList => ConstructKind::ParameterList,
            Context::Parameter(_) => ConstructKind::Parameter,
            Context::ArrayLiteral(_) => ConstructKind::ArrayLiteral,
            Context::Subscript => ConstructKind::Subscript,
            Context::Group => ConstructKind::Group,
            Context::Block => ConstructKind::Block,
            Context::Heredoc {
                kind: HeredocKind::Heredoc,
                ..
            } => ConstructKind::Heredoc,
            Context::Heredoc {
                kind: HeredocKind::Nowdoc,
                ..
            } => ConstructKind::Nowdoc,
            Context::Str(_) => ConstructKind::String,
            Context::BlockComment => ConstructKind::BlockComment,
        }
    }

    /// Function and closure headers, before a closure body opens.
    pub fn is_header(&self) -> bool {
        match self {
            Context::Function(_) => true,
            Context::Closure(phase) => *phase != FunctionPhase::Body,
            _ => false,
        }
    }
}

/// State carried from one line to the next.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct LexerState {
    pub mode: Mode,
    pub contexts: Vec<Context>,
}

impl LexerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_embedded(&self) -> bool {
        self.mode == Mode::Embedded
    }

    pub fn top(&self) -> Option<&Context> {
        self.contexts.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Context> {
        self.contexts.last_mut()
    }

    pub fn push(&mut self, context: Context) {
        tracing::debug!(?context, depth = self.contexts.len(), "push context");
        self.contexts.push(context);
    }

    pub fn pop(&mut self) -> Option<Context> {
        let context = self.contexts.pop();
        tracing::debug!(?context, depth = self.contexts.len(), "pop context");
        context
    }

    /// The terminator tag of the innermost open heredoc or nowdoc.
    pub fn heredoc_tag(&self) -> Option<&str> {
        self.contexts.iter().rev().find_map(|context| match context {
            Context::Heredoc { tag, .. } => Some(tag.as_str()),
            _ => None,
        })
    }

    /// The ambient scopes for a token emitted in this state.
    pub fn scope_stack(&self, grammar: &Grammar) -> ScopeStack {
        let mut stack = ScopeStack::new(grammar.root);
        if self.is_embedded() {
            stack.push(Scope::EmbeddedBlock);
            stack.push(Scope::SourceHack);
            stack.extend(self.contexts.iter().filter_map(Context::scope));
        }
        stack
    }

    /// Whether nothing is left open: markup mode and no contexts.
    pub fn is_clean(&self) -> bool {
        self.mode == Mode::Markup && self.contexts.is_empty()
    }
}
