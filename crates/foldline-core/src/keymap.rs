//! Key bindings for the editor's logical actions.
//!
//! Hosts configure bindings as `action → chord` strings (`{"save": "ctrl+s"}`); the session only
//! ever dispatches on the resolved [`Action`].

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Keymap parse failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeymapError {
    /// The chord string is malformed.
    #[error("invalid key chord `{0}`")]
    InvalidChord(String),
    /// Two actions are bound to the same chord.
    #[error("`{chord}` is bound to both {first} and {second}")]
    Conflict {
        /// The shared chord.
        chord: String,
        /// First action bound to it.
        first: Action,
        /// Second action bound to it.
        second: Action,
    },
    /// The JSON document could not be parsed.
    #[error("invalid keymap: {0}")]
    Parse(String),
}

/// A logical editor action a key can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Ask the host to save.
    Save,
    /// Undo the last edit.
    Undo,
    /// Redo the last undone edit.
    Redo,
    /// Cut the selection.
    Cut,
    /// Copy the selection.
    Copy,
    /// Paste from the clipboard.
    Paste,
    /// Ask the host to open search.
    Search,
    /// Select the whole document.
    SelectAll,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 8] = [
        Action::Save,
        Action::Undo,
        Action::Redo,
        Action::Cut,
        Action::Copy,
        Action::Paste,
        Action::Search,
        Action::SelectAll,
    ];

    /// Configuration name of the action.
    pub fn name(self) -> &'static str {
        match self {
            Action::Save => "save",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::Cut => "cut",
            Action::Copy => "copy",
            Action::Paste => "paste",
            Action::Search => "search",
            Action::SelectAll => "select-all",
        }
    }

    fn default_chord(self) -> &'static str {
        match self {
            Action::Save => "ctrl+s",
            Action::Undo => "ctrl+z",
            Action::Redo => "ctrl+y",
            Action::Cut => "ctrl+x",
            Action::Copy => "ctrl+c",
            Action::Paste => "ctrl+v",
            Action::Search => "ctrl+f",
            Action::SelectAll => "ctrl+a",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A key plus modifiers, e.g. `ctrl+shift+z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyChord {
    /// Control modifier.
    pub ctrl: bool,
    /// Shift modifier.
    pub shift: bool,
    /// Alt/Option modifier.
    pub alt: bool,
    /// Meta/Super/Command modifier.
    pub meta: bool,
    /// Lowercased key name (`"s"`, `"f5"`, `"enter"`).
    pub key: String,
}

impl KeyChord {
    /// A chord without modifiers.
    pub fn key(key: &str) -> Self {
        Self {
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
            key: key.to_lowercase(),
        }
    }

    /// Add the control modifier.
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Add the shift modifier.
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

impl FromStr for KeyChord {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KeymapError::InvalidChord(s.to_string());
        let mut chord = KeyChord::key("");
        let mut key = None;

        for part in s.split('+').map(str::trim) {
            match part.to_lowercase().as_str() {
                "" => return Err(invalid()),
                "ctrl" | "control" => chord.ctrl = true,
                "shift" => chord.shift = true,
                "alt" | "option" | "opt" => chord.alt = true,
                "meta" | "super" | "win" | "cmd" | "command" => chord.meta = true,
                other => {
                    if key.replace(other.to_string()).is_some() {
                        return Err(invalid());
                    }
                }
            }
        }

        chord.key = key.ok_or_else(invalid)?;
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (enabled, name) in [
            (self.ctrl, "ctrl+"),
            (self.shift, "shift+"),
            (self.alt, "alt+"),
            (self.meta, "meta+"),
        ] {
            if enabled {
                f.write_str(name)?;
            }
        }
        f.write_str(&self.key)
    }
}

/// Action → chord table.
///
/// Deserializes from a map of action names to chord strings; actions missing from the map keep
/// their default binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<Action, String>")]
pub struct KeyBindings {
    bindings: BTreeMap<Action, KeyChord>,
}

impl KeyBindings {
    /// Parse a JSON object such as `{"save": "ctrl+s", "redo": "ctrl+shift+z"}`.
    pub fn from_json(json: &str) -> Result<Self, KeymapError> {
        serde_json::from_str(json).map_err(|err| KeymapError::Parse(err.to_string()))
    }

    /// Action bound to `chord`, if any.
    pub fn resolve(&self, chord: &KeyChord) -> Option<Action> {
        self.bindings
            .iter()
            .find_map(|(action, bound)| (bound == chord).then_some(*action))
    }

    /// Parse `chord` and resolve it.
    pub fn resolve_str(&self, chord: &str) -> Option<Action> {
        chord.parse().ok().and_then(|chord| self.resolve(&chord))
    }

    /// Chord bound to `action`.
    pub fn chord_for(&self, action: Action) -> Option<&KeyChord> {
        self.bindings.get(&action)
    }

    /// Rebind `action`. Fails if another action already uses `chord`.
    pub fn bind(&mut self, action: Action, chord: KeyChord) -> Result<(), KeymapError> {
        if let Some(other) = self.resolve(&chord).filter(|other| *other != action) {
            return Err(KeymapError::Conflict {
                chord: chord.to_string(),
                first: other,
                second: action,
            });
        }
        self.bindings.insert(action, chord);
        Ok(())
    }

    /// All bindings in action order.
    pub fn iter(&self) -> impl Iterator<Item = (Action, &KeyChord)> + '_ {
        self.bindings.iter().map(|(action, chord)| (*action, chord))
    }

    fn check_conflicts(&self) -> Result<(), KeymapError> {
        let mut seen: BTreeMap<&KeyChord, Action> = BTreeMap::new();
        for (action, chord) in &self.bindings {
            if let Some(first) = seen.insert(chord, *action) {
                return Err(KeymapError::Conflict {
                    chord: chord.to_string(),
                    first,
                    second: *action,
                });
            }
        }
        Ok(())
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = Action::ALL
            .into_iter()
            .filter_map(|action| {
                action
                    .default_chord()
                    .parse()
                    .ok()
                    .map(|chord| (action, chord))
            })
            .collect();
        Self { bindings }
    }
}

impl TryFrom<BTreeMap<Action, String>> for KeyBindings {
    type Error = KeymapError;

    fn try_from(overrides: BTreeMap<Action, String>) -> Result<Self, Self::Error> {
        let mut keymap = Self::default();
        for (action, chord) in overrides {
            keymap.bindings.insert(action, chord.parse()?);
        }
        keymap.check_conflicts()?;
        Ok(keymap)
    }
}
