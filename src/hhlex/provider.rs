//! Language service for editor integrations
//!
//!     Editors consume the lexer through the [LanguageService] trait: tokenizing single
//!     lines for highlighting, looking up the scopes at a cursor for autocompletion, and
//!     turning lexical diagnostics into lint messages. [HackLanguageService] is the default
//!     implementation, configured from [HhlexConfig].
//!
//!     Every operation runs inside a `tracing` span and logs its elapsed time at debug
//!     level.

use super::config::HhlexConfig;
use super::diagnostics::{DiagnosticKind, Position, Range, Severity};
use super::document::TokenizedDocument;
use super::grammar::GrammarError;
use super::lexing::raw::is_identifier_char;
use super::lexing::{Lexer, LexerState};
use super::scope::ScopeStack;
use super::selector::{ScopeSelector, SelectorError};
use super::token::Token;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, debug_span};

#[derive(Debug)]
pub enum ProviderError {
    Grammar(GrammarError),
    Selector(SelectorError),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Grammar(e) => write!(f, "Grammar error: {}", e),
            ProviderError::Selector(e) => write!(f, "Selector error: {}", e),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Grammar(e) => Some(e),
            ProviderError::Selector(e) => Some(e),
        }
    }
}

impl From<GrammarError> for ProviderError {
    fn from(e: GrammarError) -> Self {
        ProviderError::Grammar(e)
    }
}

impl From<SelectorError> for ProviderError {
    fn from(e: SelectorError) -> Self {
        ProviderError::Selector(e)
    }
}

/// What an autocomplete provider needs to know about a cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionContext {
    /// Whether completion should be offered at the position.
    pub enabled: bool,
    pub scopes: ScopeStack,
    pub inclusion_priority: i64,
    /// The identifier or variable text immediately before the cursor.
    pub prefix: String,
}

/// A diagnostic in the shape linters report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintMessage {
    pub severity: Severity,
    pub range: Range,
    pub text: String,
    pub kind: DiagnosticKind,
}

pub trait LanguageService: Send + Sync {
    fn tokenize_line(&self, line: &str, state: &LexerState) -> (Vec<Token>, LexerState);
    fn scope_at(&self, document: &TokenizedDocument, position: Position) -> Option<ScopeStack>;
    fn completion_context(
        &self,
        document: &TokenizedDocument,
        position: Position,
    ) -> Option<CompletionContext>;
    fn lint(&self, document: &TokenizedDocument) -> Vec<LintMessage>;
}

#[derive(Debug, Clone)]
struct CompletionSettings {
    selector: ScopeSelector,
    disable_for_selector: ScopeSelector,
    inclusion_priority: i64,
}

#[derive(Debug, Clone)]
pub struct HackLanguageService {
    lexer: Lexer,
    completion: CompletionSettings,
}

impl HackLanguageService {
    pub fn from_config(config: &HhlexConfig) -> Result<Self, ProviderError> {
        let grammar = config.build_grammar()?;
        let completion = CompletionSettings {
            selector: ScopeSelector::parse(&config.completion.selector)?,
            disable_for_selector: ScopeSelector::parse(&config.completion.disable_for_selector)?,
            inclusion_priority: config.completion.inclusion_priority,
        };
        Ok(HackLanguageService {
            lexer: Lexer::new(Arc::new(grammar)),
            completion,
        })
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    /// Tokenizes `text` with this service's lexer.
    pub fn open_document(&self, text: &str) -> TokenizedDocument {
        timed("open_document", || {
            TokenizedDocument::new(self.lexer.clone(), text)
        })
    }
}

impl LanguageService for HackLanguageService {
    fn tokenize_line(&self, line: &str, state: &LexerState) -> (Vec<Token>, LexerState) {
        timed("tokenize_line", || self.lexer.tokenize_line(line, state))
    }

    fn scope_at(&self, document: &TokenizedDocument, position: Position) -> Option<ScopeStack> {
        timed("scope_at", || document.scope_at(position))
    }

    fn completion_context(
        &self,
        document: &TokenizedDocument,
        position: Position,
    ) -> Option<CompletionContext> {
        timed("completion_context", || {
            let scopes = document.scope_at(position)?;
            let enabled = self.completion.selector.matches(&scopes)
                && !self.completion.disable_for_selector.matches(&scopes);
            let prefix = document
                .line(position.line)
                .map(|line| prefix_before(line, position.column))
                .unwrap_or_default();
            Some(CompletionContext {
                enabled,
                scopes,
                inclusion_priority: self.completion.inclusion_priority,
                prefix,
            })
        })
    }

    fn lint(&self, document: &TokenizedDocument) -> Vec<LintMessage> {
        timed("lint", || {
            document
                .diagnostics()
                .into_iter()
                .filter(|diagnostic| {
                    matches!(
                        diagnostic.kind,
                        DiagnosticKind::UnterminatedConstruct(_)
                            | DiagnosticKind::UnrecognizedCharacter
                    )
                })
                .map(|diagnostic| LintMessage {
                    severity: diagnostic.severity,
                    range: diagnostic.range,
                    text: diagnostic.message,
                    kind: diagnostic.kind,
                })
                .collect()
        })
    }
}

fn timed<T>(operation: &'static str, f: impl FnOnce() -> T) -> T {
    let span = debug_span!("hhlex", operation);
    let _guard = span.enter();
    let started = Instant::now();
    let result = f();
    debug!(elapsed_us = started.elapsed().as_micros() as u64, "{} finished", operation);
    result
}

/// The identifier (with a leading `$` for variables) ending at `column`.
fn prefix_before(line: &str, column: usize) -> String {
    let before: Vec<char> = line.chars().take(column).collect();
    let mut start = before.len();
    while start > 0 && is_identifier_char(before[start - 1]) {
        start -= 1;
    }
    if start > 0 && before[start - 1] == '$' {
        start -= 1;
    }
    before[start..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hhlex::config::{load_defaults, Loader};
    use crate::hhlex::diagnostics::ConstructKind;
    use crate::hhlex::scope::Scope;

    fn service() -> HackLanguageService {
        HackLanguageService::from_config(&load_defaults().unwrap()).unwrap()
    }

    #[test]
    fn test_completion_enabled_in_code() {
        let service = service();
        let document = service.open_document("<?hh\n$value = $va");
        let context = service
            .completion_context(&document, Position::new(1, 12))
            .unwrap();
        assert!(context.enabled);
        assert_eq!(context.prefix, "$va");
        assert_eq!(context.inclusion_priority, 1);
        assert!(context.scopes.contains(&Scope::Variable));
    }

    #[test]
    fn test_completion_disabled_in_comments() {
        let service = service();
        let document = service.open_document("<?hh // note");
        let context = service
            .completion_context(&document, Position::new(0, 10))
            .unwrap();
        assert!(!context.enabled);
        assert_eq!(context.prefix, "no");
    }

    #[test]
    fn test_completion_disabled_in_markup() {
        let service = service();
        let document = service.open_document("<p>hello</p>");
        let context = service
            .completion_context(&document, Position::new(0, 5))
            .unwrap();
        assert!(!context.enabled);
    }

    #[test]
    fn test_completion_past_end_of_document() {
        let service = service();
        let document = service.open_document("<?hh");
        assert!(service
            .completion_context(&document, Position::new(3, 0))
            .is_none());
    }

    #[test]
    fn test_lint_reports_unterminated_constructs() {
        let service = service();
        let document = service.open_document("<?hh\n$x = \"open");
        let messages = service.lint(&document);
        let string = messages
            .iter()
            .find(|m| m.kind == DiagnosticKind::UnterminatedConstruct(ConstructKind::String))
            .unwrap();
        assert_eq!(string.severity, Severity::Error);
        assert_eq!(string.range.start.line, 1);
        assert_eq!(string.text, "Unterminated string literal");
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let config = Loader::new()
            .set_override("completion.selector", ", ")
            .unwrap()
            .build()
            .unwrap();
        assert!(matches!(
            HackLanguageService::from_config(&config),
            Err(ProviderError::Selector(_))
        ));
    }

    #[test]
    fn test_tokenize_line_matches_lexer() {
        let service = service();
        let state = service.lexer().initial_state();
        let (tokens, next) = service.tokenize_line("<?hh echo 1;", &state);
        assert_eq!(
            (tokens, next),
            service.lexer().tokenize_line("<?hh echo 1;", &state)
        );
    }

    #[test]
    fn test_prefix_before() {
        assert_eq!(prefix_before("foo(bar", 7), "bar");
        assert_eq!(prefix_before("$abc", 2), "$a");
        assert_eq!(prefix_before("a + ", 4), "");
    }
}
