//! Configuration loader
//!
//! `defaults/hhlex.default.toml` is embedded into the crate so the documented defaults
//! and runtime behavior stay in sync. Callers layer user files and single-key overrides
//! on top via [`Loader`] before deserializing into [`HhlexConfig`].

use super::grammar::{Grammar, GrammarError};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/hhlex.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct HhlexConfig {
    pub lexer: LexerConfig,
    pub output: OutputConfig,
    pub completion: CompletionConfig,
}

/// Grammar knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct LexerConfig {
    pub open_tags: Vec<String>,
    pub extra_magic_methods: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: String,
    pub show_diagnostics: bool,
}

/// Scope selectors that enable autocompletion.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    pub selector: String,
    pub disable_for_selector: String,
    pub inclusion_priority: i64,
}

impl HhlexConfig {
    /// The built-in grammar adjusted by the `[lexer]` table.
    ///
    /// Empty open tags are ignored; if none remain the built-in tags are kept.
    pub fn build_grammar(&self) -> Result<Grammar, GrammarError> {
        let grammar = Grammar::hack()?;
        let tags: Vec<&str> = self
            .lexer
            .open_tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .collect();
        let grammar = if tags.is_empty() {
            grammar
        } else {
            grammar.with_open_tags(tags)
        };
        Ok(grammar.with_magic_methods(&self.lexer.extra_magic_methods))
    }
}

/// Builds an [HhlexConfig] from the embedded defaults plus a project `hhlex.toml`, an
/// explicit `--config` file and command-line overrides, later layers winning.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Adds a file passed explicitly, such as `--config custom.toml`. Building fails if it
    /// does not exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Adds a file that is only read when present, such as `hhlex.toml` in the working
    /// directory.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    /// Sets one dotted key, e.g. `output.format` from `--format` or
    /// `lexer.open_tags` for an embedder that only lexes `<?hh`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merges the layers. Unknown tables are ignored; a wrongly typed value such as
    /// `open_tags = "<?hh"` is an error.
    pub fn build(self) -> Result<HhlexConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults: `<?hh` and `<?php` open tags, simple output with diagnostics,
/// completion enabled in `.source.hack` outside comments.
pub fn load_defaults() -> Result<HhlexConfig, ConfigError> {
    Loader::new().build()
}
