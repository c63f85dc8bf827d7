//! Glob-style ignore patterns for collection.

use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Set of ignore patterns.
///
/// An entry is ignored when its file name or its path relative to the
/// input root matches any pattern.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: &str) -> Result<()> {
        let compiled = Pattern::new(pattern).map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.patterns.push(compiled);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// `rel_path` is `/`-separated and relative to the input root.
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        self.patterns.iter().any(|p| {
            p.matches_with(name, MATCH_OPTIONS) || p.matches_with(rel_path, MATCH_OPTIONS)
        })
    }
}
