//! Output formats for tokenized documents
//!
//!     simple    one line per token: `line:column "value" innermost-scope`
//!     scopes    one line per token with its full scope stack
//!     json      the document as JSON (serde_json)
//!     yaml      the document as YAML (serde_yaml)
//!
//! Text formats append diagnostics after the tokens when requested. Serialized formats
//! carry them in a `diagnostics` field.

use super::diagnostics::Diagnostic;
use super::document::TokenizedDocument;
use super::token::Token;
use serde::Serialize;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    UnknownFormat(String),
    Serialization(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnknownFormat(name) => write!(f, "Format '{name}' not found"),
            FormatError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Simple,
    Json,
    Yaml,
    Scopes,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Simple,
        OutputFormat::Json,
        OutputFormat::Yaml,
        OutputFormat::Scopes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Simple => "simple",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Scopes => "scopes",
        }
    }

    fn formatter(self) -> &'static dyn Formatter {
        match self {
            OutputFormat::Simple => &SimpleFormatter,
            OutputFormat::Json => &JsonFormatter,
            OutputFormat::Yaml => &YamlFormatter,
            OutputFormat::Scopes => &ScopesFormatter,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FormatError::UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders `document` in `format`.
pub fn render(
    document: &TokenizedDocument,
    format: OutputFormat,
    show_diagnostics: bool,
) -> Result<String, FormatError> {
    format.formatter().serialize(document, show_diagnostics)
}

/// A way to serialize a tokenized document.
pub trait Formatter: Send + Sync {
    fn serialize(
        &self,
        document: &TokenizedDocument,
        show_diagnostics: bool,
    ) -> Result<String, FormatError>;
}

pub struct SimpleFormatter;

impl Formatter for SimpleFormatter {
    fn serialize(
        &self,
        document: &TokenizedDocument,
        show_diagnostics: bool,
    ) -> Result<String, FormatError> {
        Ok(write_text(document, show_diagnostics, |token| {
            token.scopes.innermost().name().to_string()
        }))
    }
}

pub struct ScopesFormatter;

impl Formatter for ScopesFormatter {
    fn serialize(
        &self,
        document: &TokenizedDocument,
        show_diagnostics: bool,
    ) -> Result<String, FormatError> {
        Ok(write_text(document, show_diagnostics, |token| {
            token.scopes.to_string()
        }))
    }
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn serialize(
        &self,
        document: &TokenizedDocument,
        show_diagnostics: bool,
    ) -> Result<String, FormatError> {
        serde_json::to_string_pretty(&DocumentView::new(document, show_diagnostics))
            .map_err(|e| FormatError::Serialization(e.to_string()))
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn serialize(
        &self,
        document: &TokenizedDocument,
        show_diagnostics: bool,
    ) -> Result<String, FormatError> {
        serde_yaml::to_string(&DocumentView::new(document, show_diagnostics))
            .map_err(|e| FormatError::Serialization(e.to_string()))
    }
}

#[derive(Serialize)]
struct DocumentView<'a> {
    lines: Vec<LineView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<Vec<Diagnostic>>,
}

#[derive(Serialize)]
struct LineView<'a> {
    line: usize,
    text: &'a str,
    tokens: &'a [Token],
}

impl<'a> DocumentView<'a> {
    fn new(document: &'a TokenizedDocument, show_diagnostics: bool) -> Self {
        let lines = (0..document.line_count())
            .map(|index| LineView {
                line: index,
                text: document.line(index).unwrap_or_default(),
                tokens: document.tokens(index).unwrap_or_default(),
            })
            .collect();
        DocumentView {
            lines,
            diagnostics: show_diagnostics.then(|| document.diagnostics()),
        }
    }
}

fn write_text(
    document: &TokenizedDocument,
    show_diagnostics: bool,
    describe: impl Fn(&Token) -> String,
) -> String {
    let mut out = String::new();
    for (line, tokens) in document.token_lines().enumerate() {
        for token in tokens {
            let _ = writeln!(
                out,
                "{}:{} {:?} {}",
                line,
                token.start_column,
                token.value,
                describe(token)
            );
        }
    }
    if show_diagnostics {
        for diagnostic in document.diagnostics() {
            let _ = writeln!(out, "{}", diagnostic);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hhlex::grammar::Grammar;
    use crate::hhlex::lexing::Lexer;
    use std::sync::Arc;

    fn document(text: &str) -> TokenizedDocument {
        let lexer = Lexer::new(Arc::new(Grammar::hack().unwrap()));
        TokenizedDocument::new(lexer, text)
    }

    #[test]
    fn test_parse_format_names() {
        assert_eq!("simple".parse::<OutputFormat>(), Ok(OutputFormat::Simple));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("yaml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert_eq!("scopes".parse::<OutputFormat>(), Ok(OutputFormat::Scopes));
        assert_eq!(
            "xml".parse::<OutputFormat>(),
            Err(FormatError::UnknownFormat("xml".to_string()))
        );
    }

    #[test]
    fn test_simple_format() {
        let output = render(&document("<?hh $a;"), OutputFormat::Simple, false).unwrap();
        assert_eq!(
            output,
            "0:0 \"<?hh\" punctuation.section.embedded.begin.php\n\
             0:4 \" \" source.hack\n\
             0:5 \"$\" punctuation.definition.variable.php\n\
             0:6 \"a\" variable.other.php\n\
             0:7 \";\" punctuation.terminator.expression.php\n"
        );
    }

    #[test]
    fn test_scopes_format_lists_full_stack() {
        let output = render(&document("<?hh 1"), OutputFormat::Scopes, false).unwrap();
        assert!(output.contains(
            "0:5 \"1\" text.html.hack meta.embedded.block.php source.hack constant.numeric.php"
        ));
    }

    #[test]
    fn test_diagnostics_are_appended() {
        let output = render(&document("<?hh /* open"), OutputFormat::Simple, true).unwrap();
        let last = output.lines().last().unwrap();
        assert!(last.starts_with("error"), "{last}");
        assert!(last.contains("Unterminated"));

        let without = render(&document("<?hh /* open"), OutputFormat::Simple, false).unwrap();
        assert!(!without.contains("Unterminated"));
    }

    #[test]
    fn test_json_format() {
        let output = render(&document("<?hh $a"), OutputFormat::Json, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let tokens = &value["lines"][0]["tokens"];
        assert_eq!(tokens[2]["value"], "$");
        assert_eq!(tokens[3]["scopes"][3], "variable.other.php");
        assert_eq!(tokens[3]["start_column"], 6);
        assert!(value["diagnostics"].is_array());

        let output = render(&document("<?hh $a"), OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(value.get("diagnostics").is_none());
    }

    #[test]
    fn test_yaml_format() {
        let output = render(&document("hello"), OutputFormat::Yaml, false).unwrap();
        assert!(output.contains("value: hello"));
        assert!(output.contains("- text.html.hack"));
    }

    #[test]
    fn test_every_format_renders_empty_document() {
        for format in OutputFormat::ALL {
            let output = render(&document(""), format, true).unwrap();
            let text_format = matches!(format, OutputFormat::Simple | OutputFormat::Scopes);
            assert_eq!(output.is_empty(), text_format, "{format}");
        }
    }
}
