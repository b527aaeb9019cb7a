//! Clipboard access.
//!
//! The editor talks to a primary [`Clipboard`] (usually the system clipboard) and keeps an
//! in-process fallback. Every successful copy is mirrored into the fallback, so a paste still
//! works when the primary later becomes unavailable.

use thiserror::Error;

/// Clipboard failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// The clipboard backend could not be reached.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    /// The platform refused access.
    #[error("clipboard access denied")]
    Denied,
    /// The clipboard holds no text.
    #[error("clipboard is empty")]
    Empty,
}

/// A text clipboard. Access is synchronous.
pub trait Clipboard {
    /// Read the clipboard text.
    fn read_text(&mut self) -> Result<String, ClipboardError>;
    /// Replace the clipboard text.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-process clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        self.contents.clone().ok_or(ClipboardError::Empty)
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// A clipboard that is never available (headless hosts, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClipboard;

impl Clipboard for UnavailableClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        Err(ClipboardError::Unavailable("no clipboard backend".to_string()))
    }

    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable("no clipboard backend".to_string()))
    }
}

/// The operating system clipboard.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    /// Connect to the system clipboard. Connection failures surface on first use.
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                tracing::warn!(error = %err, "system clipboard unavailable");
                None
            }
        };
        Self { inner }
    }

    fn inner(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        self.inner.as_mut().ok_or_else(|| {
            ClipboardError::Unavailable("system clipboard not connected".to_string())
        })
    }
}

#[cfg(feature = "system-clipboard")]
impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        self.inner()?.get_text().map_err(map_arboard_error)
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner()?
            .set_text(text.to_string())
            .map_err(map_arboard_error)
    }
}

#[cfg(feature = "system-clipboard")]
fn map_arboard_error(err: arboard::Error) -> ClipboardError {
    match err {
        arboard::Error::ContentNotAvailable => ClipboardError::Empty,
        arboard::Error::ClipboardOccupied => ClipboardError::Denied,
        other => ClipboardError::Unavailable(other.to_string()),
    }
}

/// Primary clipboard plus in-process fallback.
pub struct ClipboardBridge {
    primary: Box<dyn Clipboard + Send>,
    fallback: Box<dyn Clipboard + Send>,
}

impl ClipboardBridge {
    /// Create a bridge over `primary` with a [`MemoryClipboard`] fallback.
    pub fn new(primary: Box<dyn Clipboard + Send>) -> Self {
        Self::with_fallback(primary, Box::new(MemoryClipboard::new()))
    }

    /// Create a bridge with an explicit fallback.
    pub fn with_fallback(
        primary: Box<dyn Clipboard + Send>,
        fallback: Box<dyn Clipboard + Send>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// A bridge whose only working clipboard is in-process memory.
    pub fn in_memory() -> Self {
        Self::new(Box::new(UnavailableClipboard))
    }

    /// Write `text`. Returns `true` if at least one clipboard accepted it.
    pub fn copy(&mut self, text: &str) -> bool {
        let primary = self.primary.write_text(text);
        if let Err(err) = &primary {
            tracing::warn!(error = %err, "clipboard write failed, using fallback");
        }
        match self.fallback.write_text(text) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "fallback clipboard write failed");
                primary.is_ok()
            }
        }
    }

    /// Read text, trying the primary clipboard first.
    pub fn paste(&mut self) -> Option<String> {
        match self.primary.read_text() {
            Ok(text) => return Some(text),
            Err(err) => tracing::warn!(error = %err, "clipboard read failed, using fallback"),
        }
        match self.fallback.read_text() {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(error = %err, "fallback clipboard read failed");
                None
            }
        }
    }
}

impl Default for ClipboardBridge {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for ClipboardBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardBridge").finish_non_exhaustive()
    }
}
