//! Scope selectors
//!
//!     Completion providers are enabled or disabled by scope selectors such as
//!     `.source.hack` or `.source.hack .comment`. A selector is a comma-separated list of
//!     alternatives; an alternative is a space-separated sequence of parts, each part a
//!     dotted scope prefix. The leading dot is optional.
//!
//!         .source.hack .comment
//!             matches any stack containing a scope starting with `source.hack`, followed
//!             (not necessarily directly) by a scope starting with `comment`
//!
//!     A part matches a scope name when it is equal to it or a prefix of it ending at a
//!     dot boundary: `comment` matches `comment.line.double-slash.php`, but not
//!     `commentary`. This is the only place scope names are compared by prefix.

use super::scope::ScopeStack;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
    EmptyAlternative(usize),
    InvalidPart(String),
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::Empty => write!(f, "Empty scope selector"),
            SelectorError::EmptyAlternative(index) => {
                write!(f, "Empty alternative at position {} in scope selector", index)
            }
            SelectorError::InvalidPart(part) => write!(f, "Invalid selector part '{}'", part),
        }
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSelector {
    alternatives: Vec<Vec<String>>,
}

impl ScopeSelector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        if source.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let alternatives = source
            .split(',')
            .enumerate()
            .map(|(index, alternative)| {
                let parts: Vec<String> = alternative
                    .split_whitespace()
                    .map(parse_part)
                    .collect::<Result<_, _>>()?;
                if parts.is_empty() {
                    return Err(SelectorError::EmptyAlternative(index));
                }
                Ok(parts)
            })
            .collect::<Result<_, _>>()?;
        Ok(ScopeSelector { alternatives })
    }

    /// Whether any alternative matches `stack`.
    pub fn matches(&self, stack: &ScopeStack) -> bool {
        self.alternatives
            .iter()
            .any(|parts| matches_sequence(parts, stack))
    }
}

impl FromStr for ScopeSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScopeSelector::parse(s)
    }
}

impl fmt::Display for ScopeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alternatives: Vec<String> = self
            .alternatives
            .iter()
            .map(|parts| {
                parts
                    .iter()
                    .map(|part| format!(".{}", part))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        f.write_str(&alternatives.join(", "))
    }
}

fn parse_part(part: &str) -> Result<String, SelectorError> {
    let name = part.strip_prefix('.').unwrap_or(part);
    let valid = !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        });
    if valid {
        Ok(name.to_string())
    } else {
        Err(SelectorError::InvalidPart(part.to_string()))
    }
}

fn part_matches(part: &str, scope: &str) -> bool {
    scope == part
        || scope
            .strip_prefix(part)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Matches `parts` in order against a subsequence of the stack.
fn matches_sequence(parts: &[String], stack: &ScopeStack) -> bool {
    let mut scopes = stack.iter();
    parts
        .iter()
        .all(|part| scopes.any(|scope| part_matches(part, scope.name())))
}
