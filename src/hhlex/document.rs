//! Tokenized documents and incremental re-lexing
//!
//!     A [TokenizedDocument] keeps, for every line, its text, its tokens, its diagnostics
//!     and the lexer state it ends in. An edit replaces a range of lines; only those lines
//!     are re-lexed, and lexing continues past them only while a line's new exit state
//!     differs from the one cached before the edit. Once they agree, every later line would
//!     lex exactly as before and is left alone.
//!
//!     Lines are split on `\n` only. A `\r` before the newline stays part of the line.

use super::diagnostics::{Diagnostic, Position, Range};
use super::lexing::{Context, Lexer, LexerState};
use super::scope::ScopeStack;
use super::token::Token;
use std::ops;
use tracing::debug;

#[derive(Debug, Clone)]
struct Line {
    text: String,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    exit: LexerState,
}

#[derive(Debug, Clone)]
pub struct TokenizedDocument {
    lexer: Lexer,
    lines: Vec<Line>,
}

impl TokenizedDocument {
    pub fn new(lexer: Lexer, text: &str) -> Self {
        let mut document = TokenizedDocument {
            lexer,
            lines: Vec::new(),
        };
        let lines: Vec<&str> = text.split('\n').collect();
        document.splice_lines(0..0, &lines);
        document
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|line| line.text.as_str())
    }

    pub fn tokens(&self, index: usize) -> Option<&[Token]> {
        self.lines.get(index).map(|line| line.tokens.as_slice())
    }

    /// Iterates over the token lists of all lines.
    pub fn token_lines(&self) -> impl Iterator<Item = &[Token]> {
        self.lines.iter().map(|line| line.tokens.as_slice())
    }

    /// The state a line starts in.
    pub fn entry_state(&self, index: usize) -> LexerState {
        match index.checked_sub(1).and_then(|prev| self.lines.get(prev)) {
            Some(line) => line.exit.clone(),
            None => self.lexer.initial_state(),
        }
    }

    pub fn exit_state(&self, index: usize) -> Option<&LexerState> {
        self.lines.get(index).map(|line| &line.exit)
    }

    /// The state at the end of the document.
    pub fn final_state(&self) -> LexerState {
        self.entry_state(self.lines.len())
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replaces one line and returns the range of lines that were re-lexed, or `None` if
    /// there is no line at `index`. Use [splice_lines](Self::splice_lines) to append.
    pub fn replace_line(&mut self, index: usize, text: &str) -> Option<ops::Range<usize>> {
        if index >= self.lines.len() {
            return None;
        }
        Some(self.splice_lines(index..index + 1, &[text]))
    }

    /// Replaces `range` with `new_lines` and returns the range of lines (in the new
    /// numbering) that were re-lexed.
    ///
    /// The range is clamped to the document.
    pub fn splice_lines(&mut self, range: ops::Range<usize>, new_lines: &[&str]) -> ops::Range<usize> {
        let end = range.end.min(self.lines.len());
        let start = range.start.min(end);

        let mut state = self.entry_state(start);
        // The state the first untouched line used to start in
        let old_boundary = if end > start {
            self.lines[end - 1].exit.clone()
        } else {
            state.clone()
        };

        let replacement: Vec<Line> = new_lines
            .iter()
            .map(|text| {
                let line = self.lex_line(text, &state);
                state = line.exit.clone();
                line
            })
            .collect();
        let mut relexed_end = start + replacement.len();
        self.lines.splice(start..end, replacement);

        if state != old_boundary {
            while relexed_end < self.lines.len() {
                let line = self.lex_line(&self.lines[relexed_end].text, &state);
                let converged = line.exit == self.lines[relexed_end].exit;
                state = line.exit.clone();
                self.lines[relexed_end] = line;
                relexed_end += 1;
                if converged {
                    break;
                }
            }
        }

        debug!(
            start,
            end = relexed_end,
            removed = end - start,
            inserted = new_lines.len(),
            "re-lexed lines"
        );
        start..relexed_end
    }

    fn lex_line(&self, text: &str, state: &LexerState) -> Line {
        let result = self.lexer.tokenize_line_with_diagnostics(text, state);
        Line {
            text: text.to_string(),
            tokens: result.tokens,
            diagnostics: result.diagnostics,
            exit: result.state,
        }
    }

    /// The token at `position`: the one containing the column, else the one ending there.
    pub fn token_at(&self, position: Position) -> Option<&Token> {
        let tokens = &self.lines.get(position.line)?.tokens;
        tokens
            .iter()
            .find(|token| token.contains_column(position.column))
            .or_else(|| tokens.iter().find(|token| token.end_column == position.column))
    }

    /// The scope stack at `position`.
    ///
    /// Falls back to the ambient stack the line starts in when no token touches the
    /// column (an empty line, say). `None` only for lines past the end of the document.
    pub fn scope_at(&self, position: Position) -> Option<ScopeStack> {
        if position.line >= self.lines.len() {
            return None;
        }
        match self.token_at(position) {
            Some(token) => Some(token.scopes.clone()),
            None => Some(
                self.entry_state(position.line)
                    .scope_stack(self.lexer.grammar()),
            ),
        }
    }

    /// Diagnostics of all lines, followed by one per construct left open at the end.
    ///
    /// Unterminated constructs span from the line the construct was opened on to the end
    /// of the document.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = self
            .lines
            .iter()
            .enumerate()
            .flat_map(|(index, line)| {
                line.diagnostics
                    .iter()
                    .cloned()
                    .map(move |diagnostic| diagnostic.on_line(index))
            })
            .collect();

        let last = self.lines.len().saturating_sub(1);
        let end = Position::new(
            last,
            self.lines.get(last).map_or(0, |line| line.text.chars().count()),
        );
        let final_state = self.final_state();
        let open = self.lexer.finish(&final_state, end);
        let embedded_offset = usize::from(final_state.is_embedded());
        for (index, mut diagnostic) in open.into_iter().enumerate() {
            let start_line = match index.checked_sub(embedded_offset) {
                Some(depth) => self.opening_line(&final_state, depth),
                None => self.embedded_opening_line(),
            };
            diagnostic.range = Range::new(Position::new(start_line, 0), end);
            diagnostics.push(diagnostic);
        }
        diagnostics
    }

    /// The line that opened the context at `depth` of `state`: the last line whose entry
    /// state does not have it yet. Contexts are matched by construct, not by value, since
    /// header phases change after the opening line.
    fn opening_line(&self, state: &LexerState, depth: usize) -> usize {
        let prefix = &state.contexts[..=depth];
        let mut line = self.lines.len();
        while line > 0 && has_prefix(&self.entry_state(line - 1).contexts, prefix) {
            line -= 1;
        }
        line.saturating_sub(1)
    }

    fn embedded_opening_line(&self) -> usize {
        let mut line = self.lines.len();
        while line > 0 && self.entry_state(line - 1).is_embedded() {
            line -= 1;
        }
        line.saturating_sub(1)
    }
}

fn has_prefix(contexts: &[Context], prefix: &[Context]) -> bool {
    contexts.len() >= prefix.len()
        && contexts
            .iter()
            .zip(prefix)
            .all(|(context, expected)| context.same_construct(expected))
}
