#![warn(missing_docs)]
//! Foldline Core - headless document and folding engine for code editors
//!
//! # Overview
//!
//! `foldline-core` owns the canonical text of an editing session, derives a folded projection
//! that hides collapsed line ranges, translates coordinates between the logical document and the
//! projection, and executes a serialized set of edit commands with full undo/redo.
//!
//! It does not render anything. A host feeds it commands and key chords and reads back text,
//! selections, line mappings, gutter rows and minimap geometry.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorSession (queue, events, keymap)      │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  CommandExecutor + HistoryManager           │  ← Atomic commands, undo/redo
//! ├─────────────────────────────────────────────┤
//! │  EditPlanner (EditOperation)                │  ← Edit policies
//! ├─────────────────────────────────────────────┤
//! │  Projection + SelectionTranslator           │  ← Folded view, offset mapping
//! ├─────────────────────────────────────────────┤
//! │  FoldEngine (indentation regions)           │  ← Folding
//! ├─────────────────────────────────────────────┤
//! │  Document (Rope-based)                      │  ← Text storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use foldline_core::{EditorConfig, EditorSession};
//!
//! let mut session = EditorSession::new("if x:\n    y()\n    z()\nw()", EditorConfig::default());
//!
//! assert!(session.toggle_fold(1));
//! assert_eq!(session.projection().mapping(), &[1, 4]);
//!
//! // Offsets the host sees are projected: 6 is the start of "w()".
//! session.execute(foldline_core::Command::Edit(foldline_core::EditCommand::SetSelection {
//!     start: 6,
//!     end: 6,
//! }));
//! session.paste_at_cursor("# ");
//! assert_eq!(session.text(), "if x:\n    y()\n    z()\n# w()");
//!
//! assert!(session.do_undo());
//! assert_eq!(session.text(), "if x:\n    y()\n    z()\nw()");
//! ```
//!
//! # Coordinates
//!
//! - Offsets are character offsets (Unicode scalar values); ranges are half-open.
//! - Line numbers are 1-based everywhere in the public API.
//! - Only `'\n'` separates lines; `N` newlines give `N + 1` lines.
//!
//! # Module Description
//!
//! - [`document`] - Rope-backed text store
//! - [`folding`] - Indentation-based fold regions and collapsed anchors
//! - [`projection`] - Folded projection and line mapping
//! - [`selection`] - Logical/projected offset translation
//! - [`edit`] - Edit operation planning
//! - [`commands`] - Command executor
//! - [`history`] - Undo/redo snapshots
//! - [`session`] - Host-facing controller and events

pub mod breakpoints;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod document;
pub mod edit;
pub mod folding;
pub mod gutter;
pub mod history;
pub mod keymap;
pub mod metrics;
pub mod projection;
pub mod selection;
pub mod session;
mod text;

pub use breakpoints::Breakpoints;
#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{
    Clipboard, ClipboardBridge, ClipboardError, MemoryClipboard, UnavailableClipboard,
};
pub use commands::{
    BreakpointCommand, Command, CommandExecutor, CommandResult, EditCommand, EditorCore,
    FoldCommand,
};
pub use config::{ConfigError, EditorConfig};
pub use document::{Document, DocumentSnapshot};
pub use edit::{EditOperation, EditPlanner};
pub use folding::{FoldEngine, FoldKind, FoldRegion, detect_foldable_regions};
pub use foldline_lang::IndentConfig;
pub use gutter::{FoldMarker, GutterRow};
pub use history::{HistoryManager, UndoEntry};
pub use keymap::{Action, KeyBindings, KeyChord, KeymapError};
pub use metrics::{MetricsProvider, MinimapGeometry, MonospaceMetrics, ScrollState};
pub use projection::Projection;
pub use selection::{Selection, SelectionTranslator};
pub use session::{ChangeOrigin, CommandSender, EditorEvent, EditorSession, EventCallback};
