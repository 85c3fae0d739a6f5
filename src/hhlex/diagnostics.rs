//! Lexical diagnostics
//!
//!     Lexing never fails. Input the lexer cannot classify still produces tokens, and the
//!     problem is reported as a [Diagnostic] next to them:
//!
//!         UnrecognizedCharacter    no rule matched; a single-character token was emitted
//!         UnterminatedConstruct    a construct was still open at the end of the document
//!
//!     `AmbiguousOperatorSplit` exists for completeness of the taxonomy. It is never
//!     produced, because raw tokens are matched longest-first.

use serde::Serialize;
use std::fmt;

/// A zero-based line and column (in chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Hint => "hint",
        };
        f.write_str(name)
    }
}

/// Constructs that can be left open at the end of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructKind {
    Heredoc,
    Nowdoc,
    String,
    BlockComment,
    Closure,
    FunctionHeader,
    ParameterList,
    Parameter,
    ArrayLiteral,
    Group,
    Subscript,
    Block,
    Namespace,
    EmbeddedBlock,
}

impl ConstructKind {
    pub fn severity(self) -> Severity {
        match self {
            ConstructKind::Heredoc
            | ConstructKind::Nowdoc
            | ConstructKind::String
            | ConstructKind::BlockComment
            | ConstructKind::Closure => Severity::Error,
            // `?>` may be omitted at the end of a file
            ConstructKind::EmbeddedBlock => Severity::Hint,
            _ => Severity::Warning,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ConstructKind::Heredoc => "heredoc",
            ConstructKind::Nowdoc => "nowdoc",
            ConstructKind::String => "string literal",
            ConstructKind::BlockComment => "block comment",
            ConstructKind::Closure => "closure",
            ConstructKind::FunctionHeader => "function declaration",
            ConstructKind::ParameterList => "parameter list",
            ConstructKind::Parameter => "parameter",
            ConstructKind::ArrayLiteral => "array literal",
            ConstructKind::Group => "parenthesized expression",
            ConstructKind::Subscript => "subscript",
            ConstructKind::Block => "block",
            ConstructKind::Namespace => "namespace declaration",
            ConstructKind::EmbeddedBlock => "embedded code block",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "construct", rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnterminatedConstruct(ConstructKind),
    UnrecognizedCharacter,
    AmbiguousOperatorSplit,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::UnterminatedConstruct(construct) => construct.severity(),
            DiagnosticKind::UnrecognizedCharacter => Severity::Warning,
            DiagnosticKind::AmbiguousOperatorSplit => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub range: Range,
    pub message: String,
}

impl Diagnostic {
    pub fn unrecognized(character: char, range: Range) -> Self {
        Diagnostic {
            kind: DiagnosticKind::UnrecognizedCharacter,
            severity: DiagnosticKind::UnrecognizedCharacter.severity(),
            range,
            message: format!("Unrecognized character {:?}", character),
        }
    }

    pub fn unterminated(construct: ConstructKind, range: Range) -> Self {
        let kind = DiagnosticKind::UnterminatedConstruct(construct);
        Diagnostic {
            severity: kind.severity(),
            kind,
            range,
            message: format!("Unterminated {}", construct.description()),
        }
    }

    /// Moves a diagnostic produced for a single line onto `line`.
    pub fn on_line(mut self, line: usize) -> Self {
        let span = self.range.end.line - self.range.start.line;
        self.range.start.line = line;
        self.range.end.line = line + span;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.severity, self.range, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_taxonomy() {
        assert_eq!(ConstructKind::Heredoc.severity(), Severity::Error);
        assert_eq!(ConstructKind::String.severity(), Severity::Error);
        assert_eq!(ConstructKind::BlockComment.severity(), Severity::Error);
        assert_eq!(ConstructKind::Closure.severity(), Severity::Error);
        assert_eq!(ConstructKind::Block.severity(), Severity::Warning);
        assert_eq!(ConstructKind::Group.severity(), Severity::Warning);
        assert_eq!(ConstructKind::EmbeddedBlock.severity(), Severity::Hint);
        assert_eq!(
            DiagnosticKind::UnrecognizedCharacter.severity(),
            Severity::Warning
        );
    }

    #[test]
    fn test_on_line_keeps_columns() {
        let range = Range::new(Position::new(0, 4), Position::new(0, 5));
        let diagnostic = Diagnostic::unrecognized('`', range).on_line(7);
        assert_eq!(diagnostic.range.start, Position::new(7, 4));
        assert_eq!(diagnostic.range.end, Position::new(7, 5));
        assert_eq!(diagnostic.to_string(), "warning 7:4-7:5 Unrecognized character '`'");
    }

    #[test]
    fn test_range_contains() {
        let range = Range::new(Position::new(1, 2), Position::new(3, 0));
        assert!(range.contains(Position::new(1, 2)));
        assert!(range.contains(Position::new(2, 99)));
        assert!(!range.contains(Position::new(3, 0)));
        assert!(!range.contains(Position::new(1, 1)));
    }

    #[test]
    fn test_serializes_kind_and_construct() {
        let range = Range::new(Position::new(2, 0), Position::new(4, 0));
        let diagnostic = Diagnostic::unterminated(ConstructKind::Heredoc, range);
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["kind"], "unterminated_construct");
        assert_eq!(json["construct"], "heredoc");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["message"], "Unterminated heredoc");
    }
}
