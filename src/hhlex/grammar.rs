//! Grammar rule tables
//!
//!     The lexer's state machine is fixed, but every classification decision that maps
//!     source text to a scope is looked up in a [Grammar]: the keyword table, the operator
//!     table, the magic-method names, the string and comment delimiters, and the mode-switch
//!     tags. A grammar is built once and shared between lexers through an `Arc`, so there is
//!     no global registry to consult and tests can inject a grammar of their own.
//!
//! Rules
//!
//!     A [GrammarRule] pairs a [Pattern] with the scope it contributes:
//!
//!         Literal       exact text, for example `+=` or `public`
//!         Matcher       a regular expression, anchored at the scan position
//!         Delimiters    a begin/end pair with its own rule set active in between
//!
//!     Rules are grouped in a [RuleSet]; the first rule that matches wins.

use super::scope::Scope;
use regex::Regex;
use std::fmt;

/// Errors while building a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    InvalidMatcher { pattern: String, message: String },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::InvalidMatcher { pattern, message } => {
                write!(f, "Invalid matcher '{}': {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    Matcher(Regex),
    Delimiters {
        begin: String,
        end: String,
        inside: RuleSet,
    },
}

#[derive(Debug, Clone)]
pub struct GrammarRule {
    pub pattern: Pattern,
    pub scope: Scope,
}

impl GrammarRule {
    pub fn literal(text: impl Into<String>, scope: Scope) -> Self {
        GrammarRule {
            pattern: Pattern::Literal(text.into()),
            scope,
        }
    }

    /// Compiles `pattern` so that it only ever matches at the start of the input.
    pub fn matcher(pattern: &str, scope: Scope) -> Result<Self, GrammarError> {
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| {
            GrammarError::InvalidMatcher {
                pattern: pattern.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(GrammarRule {
            pattern: Pattern::Matcher(regex),
            scope,
        })
    }

    pub fn delimiters(
        begin: impl Into<String>,
        end: impl Into<String>,
        inside: RuleSet,
        scope: Scope,
    ) -> Self {
        GrammarRule {
            pattern: Pattern::Delimiters {
                begin: begin.into(),
                end: end.into(),
                inside,
            },
            scope,
        }
    }

    /// Length in bytes of the match at the start of `text`, if any.
    ///
    /// Delimiter rules match their begin text.
    pub fn match_len(&self, text: &str) -> Option<usize> {
        match &self.pattern {
            Pattern::Literal(literal) => text.starts_with(literal.as_str()).then(|| literal.len()),
            Pattern::Matcher(regex) => regex
                .find(text)
                .map(|found| found.end())
                .filter(|len| *len > 0),
            Pattern::Delimiters { begin, .. } => {
                text.starts_with(begin.as_str()).then(|| begin.len())
            }
        }
    }

    /// Whether the rule matches the whole of `text`.
    pub fn matches_exactly(&self, text: &str) -> bool {
        match &self.pattern {
            Pattern::Literal(literal) => literal == text,
            Pattern::Matcher(_) | Pattern::Delimiters { .. } => {
                self.match_len(text) == Some(text.len())
            }
        }
    }

    pub fn begin(&self) -> Option<&str> {
        match &self.pattern {
            Pattern::Delimiters { begin, .. } => Some(begin),
            _ => None,
        }
    }

    pub fn end(&self) -> Option<&str> {
        match &self.pattern {
            Pattern::Delimiters { end, .. } => Some(end),
            _ => None,
        }
    }

    /// Rules active between the delimiters.
    pub fn inside(&self) -> Option<&RuleSet> {
        match &self.pattern {
            Pattern::Delimiters { inside, .. } => Some(inside),
            _ => None,
        }
    }
}

/// An ordered list of rules; earlier rules take priority.
#[derive(Debug, Clone, Default)]
pub struct RuleSet(Vec<GrammarRule>);

impl RuleSet {
    pub fn new(rules: Vec<GrammarRule>) -> Self {
        RuleSet(rules)
    }

    /// Builds a set of literal rules sharing one scope.
    pub fn literals<'a>(words: impl IntoIterator<Item = &'a str>, scope: Scope) -> Self {
        RuleSet(
            words
                .into_iter()
                .map(|word| GrammarRule::literal(word, scope))
                .collect(),
        )
    }

    pub fn push(&mut self, rule: GrammarRule) {
        self.0.push(rule);
    }

    pub fn extend(&mut self, other: RuleSet) {
        self.0.extend(other.0);
    }

    /// First rule matching at the start of `text`, with the match length.
    pub fn match_at(&self, text: &str) -> Option<(usize, Scope)> {
        self.0
            .iter()
            .find_map(|rule| rule.match_len(text).map(|len| (len, rule.scope)))
    }

    /// Scope of the first rule matching the whole of `text`.
    pub fn match_exact(&self, text: &str) -> Option<Scope> {
        self.0
            .iter()
            .find(|rule| rule.matches_exactly(text))
            .map(|rule| rule.scope)
    }

    pub fn rules(&self) -> &[GrammarRule] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub const MAGIC_METHODS: &[&str] = &[
    "__construct",
    "__destruct",
    "__call",
    "__callStatic",
    "__get",
    "__set",
    "__isset",
    "__unset",
    "__sleep",
    "__wakeup",
    "__serialize",
    "__unserialize",
    "__toString",
    "__invoke",
    "__set_state",
    "__clone",
    "__debugInfo",
    "__dispose",
];

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "final",
    "abstract",
    "const",
    "async",
    "var",
    "readonly",
    "extends",
    "implements",
];

const TYPES: &[&str] = &[
    "int",
    "float",
    "double",
    "string",
    "bool",
    "boolean",
    "void",
    "mixed",
    "num",
    "arraykey",
    "noreturn",
    "nothing",
    "dynamic",
    "nonnull",
    "resource",
    "callable",
    "iterable",
    "object",
    "vec",
    "dict",
    "keyset",
    "varray",
    "darray",
    "shape",
    "tuple",
];

const CLASS_KEYWORDS: &[&str] = &["class", "interface", "trait", "enum"];

const TYPEDECL_KEYWORDS: &[&str] = &["newtype", "type"];

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "elseif", "while", "do", "for", "foreach", "switch", "case", "default",
    "break", "continue", "return", "throw", "try", "catch", "finally", "goto", "yield",
    "await", "as", "declare", "match", "concurrent", "using",
];

const CONSTRUCTS: &[&str] = &[
    "echo",
    "print",
    "isset",
    "unset",
    "empty",
    "list",
    "exit",
    "die",
    "eval",
    "include",
    "include_once",
    "require",
    "require_once",
];

/// Operators in longest-first order within each family.
const OPERATORS: &[(&str, Scope)] = &[
    ("<<=", Scope::AssignmentOperator),
    (">>=", Scope::AssignmentOperator),
    ("**=", Scope::AssignmentOperator),
    ("??=", Scope::AssignmentOperator),
    ("+=", Scope::AssignmentOperator),
    ("-=", Scope::AssignmentOperator),
    ("*=", Scope::AssignmentOperator),
    ("/=", Scope::AssignmentOperator),
    ("%=", Scope::AssignmentOperator),
    ("&=", Scope::AssignmentOperator),
    ("|=", Scope::AssignmentOperator),
    ("^=", Scope::AssignmentOperator),
    (".=", Scope::StringOperator),
    ("===", Scope::ComparisonOperator),
    ("!==", Scope::ComparisonOperator),
    ("<=>", Scope::ComparisonOperator),
    ("==>", Scope::LambdaOperator),
    ("==", Scope::ComparisonOperator),
    ("!=", Scope::ComparisonOperator),
    ("<>", Scope::ComparisonOperator),
    ("<=", Scope::ComparisonOperator),
    (">=", Scope::ComparisonOperator),
    ("...", Scope::SpreadOperator),
    ("?->", Scope::ClassOperator),
    ("->", Scope::ClassOperator),
    ("::", Scope::ClassOperator),
    ("=>", Scope::KeyOperator),
    ("??", Scope::NullCoalescingOperator),
    ("|>", Scope::PipeOperator),
    ("&&", Scope::LogicalOperator),
    ("||", Scope::LogicalOperator),
    ("++", Scope::IncrementDecrementOperator),
    ("--", Scope::IncrementDecrementOperator),
    ("**", Scope::ArithmeticOperator),
    ("<<", Scope::BitwiseOperator),
    (">>", Scope::BitwiseOperator),
    ("=", Scope::AssignmentOperator),
    ("+", Scope::ArithmeticOperator),
    ("-", Scope::ArithmeticOperator),
    ("*", Scope::ArithmeticOperator),
    ("/", Scope::ArithmeticOperator),
    ("%", Scope::ArithmeticOperator),
    (".", Scope::StringOperator),
    ("<", Scope::ComparisonOperator),
    (">", Scope::ComparisonOperator),
    ("!", Scope::LogicalOperator),
    ("&", Scope::BitwiseOperator),
    ("|", Scope::BitwiseOperator),
    ("^", Scope::BitwiseOperator),
    ("~", Scope::BitwiseOperator),
    ("?", Scope::TernaryOperator),
    (":", Scope::TernaryOperator),
    ("@", Scope::ErrorControlOperator),
];

/// The complete rule table consulted by the lexer.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub root: Scope,
    pub open_tags: Vec<String>,
    pub close_tag: String,
    pub keywords: RuleSet,
    pub operators: RuleSet,
    pub magic_methods: RuleSet,
    pub single_quoted: GrammarRule,
    pub double_quoted: GrammarRule,
    pub block_comment: GrammarRule,
    /// Escape rules inside heredoc bodies.
    pub heredoc_escapes: RuleSet,
}

impl Grammar {
    /// The built-in grammar for Hack embedded in HTML.
    pub fn hack() -> Result<Self, GrammarError> {
        let mut keywords = RuleSet::new(vec![
            GrammarRule::matcher("(?i:true|false|null)", Scope::LanguageConstant)?,
            GrammarRule::matcher("__[A-Z][A-Z_]*__", Scope::LanguageConstant)?,
        ]);
        keywords.extend(RuleSet::literals(MODIFIERS.iter().copied(), Scope::StorageModifier));
        keywords.extend(RuleSet::literals(TYPES.iter().copied(), Scope::StorageType));
        keywords.extend(RuleSet::literals(CLASS_KEYWORDS.iter().copied(), Scope::ClassStorage));
        keywords.extend(RuleSet::literals(
            TYPEDECL_KEYWORDS.iter().copied(),
            Scope::TypeDeclaration,
        ));
        keywords.extend(RuleSet::literals(CONTROL_KEYWORDS.iter().copied(), Scope::ControlKeyword));
        keywords.extend(RuleSet::literals(CONSTRUCTS.iter().copied(), Scope::Construct));
        keywords.extend(RuleSet::literals(["and", "or", "xor"], Scope::LogicalOperator));
        keywords.push(GrammarRule::literal("instanceof", Scope::TypeOperator));
        keywords.push(GrammarRule::literal("new", Scope::NewKeyword));
        keywords.push(GrammarRule::literal("use", Scope::UseKeyword));

        let operators = RuleSet::new(
            OPERATORS
                .iter()
                .map(|(text, scope)| GrammarRule::literal(*text, *scope))
                .collect(),
        );

        let double_escapes = GrammarRule::matcher(
            r#"\\(?:[nrtvef\\$"]|[0-7]{1,3}|x[0-9A-Fa-f]{1,2}|u\{[0-9A-Fa-f]+\})"#,
            Scope::Escape,
        )?;
        let heredoc_escapes = RuleSet::new(vec![GrammarRule::matcher(
            r#"\\(?:[nrtvef\\$]|[0-7]{1,3}|x[0-9A-Fa-f]{1,2}|u\{[0-9A-Fa-f]+\})"#,
            Scope::Escape,
        )?]);

        Ok(Grammar {
            root: Scope::TextHtmlHack,
            open_tags: vec!["<?hh".to_string(), "<?php".to_string()],
            close_tag: "?>".to_string(),
            keywords,
            operators,
            magic_methods: RuleSet::literals(MAGIC_METHODS.iter().copied(), Scope::MagicFunction),
            single_quoted: GrammarRule::delimiters(
                "'",
                "'",
                RuleSet::new(vec![GrammarRule::matcher(r"\\['\\]", Scope::Escape)?]),
                Scope::SingleQuotedString,
            ),
            double_quoted: GrammarRule::delimiters(
                "\"",
                "\"",
                RuleSet::new(vec![double_escapes]),
                Scope::DoubleQuotedString,
            ),
            block_comment: GrammarRule::delimiters("/*", "*/", RuleSet::default(), Scope::BlockComment),
            heredoc_escapes,
        })
    }

    /// Replaces the set of tags that switch from markup into embedded code.
    pub fn with_open_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.open_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Adds names to the magic-method rule set.
    pub fn with_magic_methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.magic_methods
                .push(GrammarRule::literal(name.as_ref(), Scope::MagicFunction));
        }
        self
    }

    pub fn is_magic_method(&self, name: &str) -> bool {
        self.magic_methods.match_exact(name).is_some()
    }

    pub fn keyword_scope(&self, word: &str) -> Option<Scope> {
        self.keywords.match_exact(word)
    }

    pub fn operator_scope(&self, operator: &str) -> Option<Scope> {
        self.operators.match_exact(operator)
    }
}
