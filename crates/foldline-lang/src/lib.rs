#![warn(missing_docs)]
//! `foldline-lang` - indentation configuration helpers for `foldline-core`.
//!
//! This crate intentionally stays lightweight and knows nothing about grammars. It provides the
//! small amount of whitespace arithmetic the editor kernel needs to implement indentation-based
//! folding, auto-indent and block indent/outdent in a language-agnostic way.

use serde::Deserialize;

/// Indentation settings for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IndentConfig {
    /// Width of a `'\t'` in columns when measuring indentation.
    pub tab_width: usize,
    /// Number of spaces inserted by one indent step (and removed by one outdent step).
    pub indent_width: usize,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            indent_width: 4,
        }
    }
}

impl IndentConfig {
    /// Create a config with explicit tab and indent widths (both clamped to at least 1).
    pub fn new(tab_width: usize, indent_width: usize) -> Self {
        Self {
            tab_width: tab_width.max(1),
            indent_width: indent_width.max(1),
        }
    }

    /// The text inserted by one indent step.
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.indent_width)
    }

    /// Indentation width of `line` in columns.
    ///
    /// Tabs count as `tab_width` columns and spaces as one; measurement stops at the first
    /// non-blank character.
    pub fn indent_width_of(&self, line: &str) -> usize {
        line.chars()
            .take_while(|ch| *ch == ' ' || *ch == '\t')
            .map(|ch| if ch == '\t' { self.tab_width } else { 1 })
            .sum()
    }

    /// Number of leading characters one outdent step removes from `line`.
    ///
    /// A single leading tab is removed on its own; otherwise up to `indent_width` leading spaces.
    pub fn outdent_len(&self, line: &str) -> usize {
        if line.starts_with('\t') {
            return 1;
        }
        line.chars()
            .take(self.indent_width)
            .take_while(|ch| *ch == ' ')
            .count()
    }
}

/// Returns `true` for empty or whitespace-only lines.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// The run of spaces and tabs at the start of `line`.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|ch: char| ch != ' ' && ch != '\t')
        .unwrap_or(line.len());
    &line[..end]
}
