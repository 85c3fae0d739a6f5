//! Scope tags and scope stacks
//!
//!     Every token carries an ordered list of scope names, outer to inner, in the dotted
//!     naming convention used by editor grammars (`text.html.hack`, `variable.other.php`).
//!     Rather than passing those names around as strings, the lexer works with the typed
//!     [Scope] enumeration and only converts to strings at the edges (serialization, fixture
//!     parsing, selectors). Comparing two stacks is structural equality on enum values, so a
//!     check for `variable.other.php` can never be satisfied by `variable.other.phpx`.
//!
//! Stack Layout
//!
//!     A [ScopeStack] always starts with the grammar's root scope. In embedded mode the mode
//!     itself contributes the embedded block and source scopes, then each scope-bearing
//!     lexical context adds one scope. A token appends its own leaf scopes last:
//!
//!         text.html.hack                      root
//!         meta.embedded.block.php             embedded mode
//!         source.hack                         embedded mode
//!         meta.function.php                   Function context
//!         entity.name.function.php            leaf

use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

macro_rules! scopes {
    ($($variant:ident => $name:literal,)*) => {
        /// A single scope tag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Scope {
            $($variant,)*
        }

        impl Scope {
            /// Every known scope, in declaration order.
            pub const ALL: &'static [Scope] = &[$(Scope::$variant,)*];

            /// The dotted scope name.
            pub fn name(self) -> &'static str {
                match self {
                    $(Scope::$variant => $name,)*
                }
            }
        }

        impl FromStr for Scope {
            type Err = UnknownScope;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Scope::$variant),)*
                    _ => Err(UnknownScope(s.to_string())),
                }
            }
        }
    };
}

scopes! {
    // Document and embedding
    TextHtmlHack => "text.html.hack",
    EmbeddedBlock => "meta.embedded.block.php",
    SourceHack => "source.hack",
    EmbeddedBegin => "punctuation.section.embedded.begin.php",
    EmbeddedEnd => "punctuation.section.embedded.end.php",

    // Variables
    Variable => "variable.other.php",
    VariablePunctuation => "punctuation.definition.variable.php",

    // Operators
    AssignmentOperator => "keyword.operator.assignment.php",
    ArithmeticOperator => "keyword.operator.arithmetic.php",
    StringOperator => "keyword.operator.string.php",
    ComparisonOperator => "keyword.operator.comparison.php",
    LogicalOperator => "keyword.operator.logical.php",
    BitwiseOperator => "keyword.operator.bitwise.php",
    IncrementDecrementOperator => "keyword.operator.increment-decrement.php",
    ClassOperator => "keyword.operator.class.php",
    KeyOperator => "keyword.operator.key.php",
    TernaryOperator => "keyword.operator.ternary.php",
    NullCoalescingOperator => "keyword.operator.null-coalescing.php",
    ErrorControlOperator => "keyword.operator.error-control.php",
    SpreadOperator => "keyword.operator.spread.php",
    PipeOperator => "keyword.operator.pipe.php",
    LambdaOperator => "keyword.operator.lambda.php",
    TypeOperator => "keyword.operator.type.php",

    // Strings
    Heredoc => "string.unquoted.heredoc.php",
    HeredocOperator => "keyword.operator.heredoc.php",
    Nowdoc => "string.unquoted.nowdoc.php",
    NowdocOperator => "keyword.operator.nowdoc.php",
    SingleQuotedString => "string.quoted.single.php",
    DoubleQuotedString => "string.quoted.double.php",
    StringBegin => "punctuation.definition.string.begin.php",
    StringEnd => "punctuation.definition.string.end.php",
    Escape => "constant.character.escape.php",

    // Constants and statements
    Numeric => "constant.numeric.php",
    LanguageConstant => "constant.language.php",
    Terminator => "punctuation.terminator.expression.php",

    // Namespaces
    Namespace => "meta.namespace.php",
    NamespaceKeyword => "keyword.other.namespace.php",
    NamespaceName => "entity.name.type.namespace.php",
    UseKeyword => "keyword.other.use.php",

    // Functions and closures
    Function => "meta.function.php",
    Closure => "meta.function.closure.php",
    FunctionStorage => "storage.type.function.php",
    FunctionName => "entity.name.function.php",
    MagicFunction => "support.function.magic.php",
    Arguments => "meta.function.arguments.php",
    ArgumentArray => "meta.function.argument.array.php",
    ArgumentShortArray => "meta.function.argument.short.array.php",
    ParametersBegin => "punctuation.definition.parameters.begin.php",
    ParametersEnd => "punctuation.definition.parameters.end.php",
    ClosureUse => "keyword.other.function.use.php",

    // Arrays and language constructs
    Construct => "support.function.construct.php",
    ArrayBegin => "punctuation.definition.array.begin.php",
    ArrayEnd => "punctuation.definition.array.end.php",
    ShortArrayBegin => "punctuation.definition.short.array.begin.php",
    ShortArrayEnd => "punctuation.definition.short.array.end.php",

    // Blocks
    ScopeBegin => "punctuation.section.scope.begin.php",
    ScopeEnd => "punctuation.section.scope.end.php",

    // Types and declarations
    StorageType => "storage.type.php",
    StorageModifier => "storage.modifier.php",
    ClassStorage => "storage.type.class.php",
    ClassName => "entity.name.type.class.php",
    TypeDeclaration => "storage.type.typedecl.php",
    ControlKeyword => "keyword.control.php",
    NewKeyword => "keyword.other.new.php",

    // Comments
    LineCommentDoubleSlash => "comment.line.double-slash.php",
    LineCommentNumberSign => "comment.line.number-sign.php",
    BlockComment => "comment.block.php",
    CommentPunctuation => "punctuation.definition.comment.php",
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Returned when a string does not name a known [Scope].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScope(pub String);

impl fmt::Display for UnknownScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown scope name: {}", self.0)
    }
}

impl std::error::Error for UnknownScope {}

/// Ordered scopes active at a token, outer to inner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ScopeStack(Vec<Scope>);

impl ScopeStack {
    /// A stack holding only the root scope.
    pub fn new(root: Scope) -> Self {
        ScopeStack(vec![root])
    }

    pub fn push(&mut self, scope: Scope) {
        self.0.push(scope);
    }

    /// Returns a copy of this stack with `leaves` appended.
    pub fn with(&self, leaves: &[Scope]) -> Self {
        let mut scopes = Vec::with_capacity(self.0.len() + leaves.len());
        scopes.extend_from_slice(&self.0);
        scopes.extend_from_slice(leaves);
        ScopeStack(scopes)
    }

    pub fn root(&self) -> Scope {
        self.0[0]
    }

    /// The innermost scope.
    pub fn innermost(&self) -> Scope {
        self.0[self.0.len() - 1]
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|scope| scope.name()).collect()
    }

    pub fn as_slice(&self) -> &[Scope] {
        &self.0
    }
}

impl Deref for ScopeStack {
    type Target = [Scope];

    fn deref(&self) -> &[Scope] {
        &self.0
    }
}

impl Extend<Scope> for ScopeStack {
    fn extend<I: IntoIterator<Item = Scope>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl fmt::Display for ScopeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(" "))
    }
}
