//! Editor configuration.

use crate::folding::DEFAULT_RECOMPUTE_DRIFT;
use crate::history::DEFAULT_MAX_UNDO;
use crate::keymap::KeyBindings;
use foldline_lang::IndentConfig;
use serde::Deserialize;
use thiserror::Error;

/// Configuration load failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid editor config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Session configuration. Every field is optional in JSON.
///
/// ```json
/// {
///   "indent": { "tab_width": 4, "indent_width": 2 },
///   "fold_recompute_drift": 10,
///   "max_undo": 500,
///   "keymap": { "redo": "ctrl+shift+z" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Indentation settings.
    pub indent: IndentConfig,
    /// Line-count drift that triggers a full fold-region recompute.
    pub fold_recompute_drift: usize,
    /// Maximum undo depth.
    pub max_undo: usize,
    /// Action key bindings.
    pub keymap: KeyBindings,
}

impl EditorConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    fn normalized(self) -> Self {
        Self {
            indent: IndentConfig::new(self.indent.tab_width, self.indent.indent_width),
            fold_recompute_drift: self.fold_recompute_drift.max(1),
            max_undo: self.max_undo.max(1),
            keymap: self.keymap,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent: IndentConfig::default(),
            fold_recompute_drift: DEFAULT_RECOMPUTE_DRIFT,
            max_undo: DEFAULT_MAX_UNDO,
            keymap: KeyBindings::default(),
        }
    }
}
