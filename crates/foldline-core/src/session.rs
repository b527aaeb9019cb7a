//! Editor session: the host-facing controller.
//!
//! # Overview
//!
//! [`EditorSession`] owns the [`CommandExecutor`], an ordered command queue and the event
//! subscribers. Hosts either call the convenience methods (`set_content`, `toggle_fold`,
//! `do_undo`, ...) or enqueue [`Command`]s through a [`CommandSender`]. Either way every command
//! runs to completion before the next one starts, in the order it was submitted.
//!
//! After each command the session compares the observable state before and after and notifies
//! subscribers with typed [`EditorEvent`]s. Callbacks cannot touch the session directly; they
//! enqueue follow-up commands through a [`CommandSender`], which run right after the command
//! that triggered them.
//!
//! # Example
//!
//! ```rust
//! use foldline_core::{EditorConfig, EditorEvent, EditorSession};
//! use std::sync::{Arc, Mutex};
//!
//! let mut session = EditorSession::new("if x:\n    y()\nw()", EditorConfig::default());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! session.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
//!
//! assert!(session.toggle_fold(1));
//! assert_eq!(session.projection().text(), "if x:\nw()");
//! assert!(matches!(seen.lock().unwrap()[0], EditorEvent::FoldingChanged { .. }));
//! ```

use crate::breakpoints::Breakpoints;
use crate::clipboard::ClipboardBridge;
use crate::commands::{
    BreakpointCommand, Command, CommandExecutor, CommandResult, EditCommand, FoldCommand,
};
use crate::config::{ConfigError, EditorConfig};
use crate::gutter::{GutterRow, gutter_rows};
use crate::keymap::{Action, KeyChord};
use crate::metrics::{MetricsProvider, MinimapGeometry, MonospaceMetrics, gutter_width};
use crate::projection::Projection;
use crate::selection::Selection;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};

/// What caused a document change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOrigin {
    /// An editing command (typing, paste, indent, ...).
    Edit,
    /// Undo.
    Undo,
    /// Redo.
    Redo,
    /// Whole-document replacement by the host.
    External,
}

/// Notifications delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The document text changed.
    DocumentChanged {
        /// Full text after the change.
        text: String,
        /// Projected selection after the change.
        selection: Selection,
        /// Document version after the change.
        version: u64,
        /// What caused it.
        origin: ChangeOrigin,
    },
    /// The projected selection changed without a document change.
    SelectionChanged {
        /// Projected selection.
        selection: Selection,
    },
    /// Fold regions or the collapsed set changed.
    FoldingChanged {
        /// Collapsed anchor lines.
        folded: Vec<usize>,
    },
    /// The breakpoint set changed.
    BreakpointsChanged {
        /// Breakpoint lines.
        lines: Vec<usize>,
    },
    /// The user asked to save.
    SaveRequested,
    /// The user asked to search; `query` is the selected text.
    SearchRequested {
        /// Initial query.
        query: String,
    },
}

/// Event callback function type
pub type EventCallback = Box<dyn FnMut(&EditorEvent) + Send>;

/// Cloneable handle that enqueues commands on a session.
#[derive(Debug, Clone)]
pub struct CommandSender {
    sender: Sender<Command>,
}

impl CommandSender {
    /// Enqueue `command`. Returns `false` if the session is gone.
    pub fn send(&self, command: Command) -> bool {
        self.sender.send(command).is_ok()
    }
}

/// State observed before a command, used to derive events.
struct Observed {
    version: u64,
    selection: Selection,
    fold_revision: u64,
    breakpoints: Breakpoints,
}

/// Host-facing editor controller.
pub struct EditorSession {
    executor: CommandExecutor,
    sender: Sender<Command>,
    queue: Receiver<Command>,
    callbacks: Vec<EventCallback>,
    metrics: Box<dyn MetricsProvider + Send>,
}

impl EditorSession {
    /// Create a session with an in-memory clipboard and unit monospace metrics.
    pub fn new(text: &str, config: EditorConfig) -> Self {
        Self::with_parts(
            text,
            config,
            ClipboardBridge::default(),
            Box::new(MonospaceMetrics::default()),
        )
    }

    /// Create a session from a JSON configuration document.
    pub fn from_json_config(text: &str, json: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(text, EditorConfig::from_json(json)?))
    }

    /// Create a session with an explicit clipboard and metrics provider.
    pub fn with_parts(
        text: &str,
        config: EditorConfig,
        clipboard: ClipboardBridge,
        metrics: Box<dyn MetricsProvider + Send>,
    ) -> Self {
        let (sender, queue) = mpsc::channel();
        Self {
            executor: CommandExecutor::with_clipboard(text, config, clipboard),
            sender,
            queue,
            callbacks: Vec::new(),
            metrics,
        }
    }

    /// The command executor (read-only).
    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// Active configuration.
    pub fn config(&self) -> &EditorConfig {
        self.executor.config()
    }

    /// Replace the metrics provider.
    pub fn set_metrics(&mut self, metrics: Box<dyn MetricsProvider + Send>) {
        self.metrics = metrics;
    }

    /// Subscribe to editor events.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&EditorEvent) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// A handle for enqueueing commands.
    pub fn command_sender(&self) -> CommandSender {
        CommandSender {
            sender: self.sender.clone(),
        }
    }

    /// Run every queued command in order. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(command) = self.queue.try_recv() {
            self.apply(command);
            count += 1;
        }
        count
    }

    /// Run `command` after everything already queued, then anything its events enqueued.
    pub fn execute(&mut self, command: Command) -> CommandResult {
        self.run_pending();
        let result = self.apply(command);
        self.run_pending();
        result
    }

    // Host API

    /// Replace the whole document (undoable). Returns `true` if the text changed.
    pub fn set_content(&mut self, text: &str) -> bool {
        self.execute(Command::SetContent {
            text: text.to_string(),
        })
        .is_edit()
    }

    /// Reveal logical line `line`, unfolding what hides it. Returns `false` when out of range.
    pub fn jump_to_line(&mut self, line: usize) -> bool {
        self.execute(Command::JumpToLine { line }) != CommandResult::Rejected
    }

    /// Select the whole document.
    pub fn select_all(&mut self) {
        self.execute(Command::Edit(EditCommand::SelectAll));
    }

    /// Paste `text` over the selection. Returns `true` if the document changed.
    pub fn paste_at_cursor(&mut self, text: &str) -> bool {
        self.execute(Command::Edit(EditCommand::Paste {
            text: text.to_string(),
        }))
        .is_edit()
    }

    /// Undo. Returns `false` when there is nothing to undo.
    pub fn do_undo(&mut self) -> bool {
        self.execute(Command::Edit(EditCommand::Undo)).is_edit()
    }

    /// Redo. Returns `false` when there is nothing to redo.
    pub fn do_redo(&mut self) -> bool {
        self.execute(Command::Edit(EditCommand::Redo)).is_edit()
    }

    /// Returns `true` if undo is possible.
    pub fn can_undo(&self) -> bool {
        self.executor.can_undo()
    }

    /// Returns `true` if redo is possible.
    pub fn can_redo(&self) -> bool {
        self.executor.can_redo()
    }

    /// Flip the fold anchored at logical line `line`. Returns `false` if `line` is not an anchor.
    pub fn toggle_fold(&mut self, line: usize) -> bool {
        self.execute(Command::Fold(FoldCommand::Toggle { line })) != CommandResult::Rejected
    }

    /// Collapse every region. Returns `true` if anything changed.
    pub fn fold_all(&mut self) -> bool {
        self.execute(Command::Fold(FoldCommand::FoldAll)) == CommandResult::Updated
    }

    /// Expand every region. Returns `true` if anything changed.
    pub fn unfold_all(&mut self) -> bool {
        self.execute(Command::Fold(FoldCommand::UnfoldAll)) == CommandResult::Updated
    }

    /// Flip the breakpoint on logical line `line`. Returns `false` when out of range.
    pub fn toggle_breakpoint(&mut self, line: usize) -> bool {
        self.execute(Command::Breakpoint(BreakpointCommand::Toggle { line }))
            != CommandResult::Rejected
    }

    /// Breakpoint lines in ascending order.
    pub fn breakpoints(&self) -> Vec<usize> {
        self.executor.core().breakpoints().iter().collect()
    }

    /// Returns `true` if logical line `line` has a breakpoint.
    pub fn has_breakpoint(&self, line: usize) -> bool {
        self.executor.core().breakpoints().contains(line)
    }

    /// Replace the breakpoint set (out-of-range lines are dropped).
    pub fn set_breakpoints(&mut self, lines: impl IntoIterator<Item = usize>) {
        self.execute(Command::Breakpoint(BreakpointCommand::Replace {
            lines: lines.into_iter().collect(),
        }));
    }

    /// Remove every breakpoint.
    pub fn clear_breakpoints(&mut self) {
        self.execute(Command::Breakpoint(BreakpointCommand::Clear));
    }

    /// Resolve a chord string (e.g. `"ctrl+z"`) through the keymap and dispatch its action.
    ///
    /// Returns `None` if the chord is unbound.
    pub fn handle_key(&mut self, chord: &str) -> Option<CommandResult> {
        let chord: KeyChord = match chord.parse() {
            Ok(chord) => chord,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring key");
                return None;
            }
        };
        self.handle_chord(&chord)
    }

    /// Dispatch the action bound to `chord`, if any.
    pub fn handle_chord(&mut self, chord: &KeyChord) -> Option<CommandResult> {
        let action = self.config().keymap.resolve(chord)?;
        Some(self.dispatch_action(action))
    }

    /// Perform a logical action.
    pub fn dispatch_action(&mut self, action: Action) -> CommandResult {
        let edit = match action {
            Action::Save => {
                self.run_pending();
                self.emit(EditorEvent::SaveRequested);
                self.run_pending();
                return CommandResult::Unchanged;
            }
            Action::Search => {
                self.run_pending();
                let query = self.executor.core().selected_text();
                self.emit(EditorEvent::SearchRequested { query });
                self.run_pending();
                return CommandResult::Unchanged;
            }
            Action::Undo => EditCommand::Undo,
            Action::Redo => EditCommand::Redo,
            Action::Cut => EditCommand::Cut,
            Action::Copy => EditCommand::Copy,
            Action::Paste => EditCommand::PasteFromClipboard,
            Action::SelectAll => EditCommand::SelectAll,
        };
        self.execute(Command::Edit(edit))
    }

    // Read queries

    /// Full document text.
    pub fn text(&self) -> String {
        self.executor.core().text()
    }

    /// Selection in projected coordinates.
    pub fn selection(&self) -> Selection {
        self.executor.core().selection()
    }

    /// Current projection.
    pub fn projection(&self) -> &Projection {
        self.executor.core().projection()
    }

    /// Re-slice per-logical-line highlight markup to the visible lines.
    pub fn visible_highlights<'a, T>(&self, per_line: &'a [T]) -> Vec<Option<&'a T>> {
        let projection = self.projection();
        if per_line.len() != projection.logical_line_count() {
            tracing::warn!(
                markup_lines = per_line.len(),
                document_lines = projection.logical_line_count(),
                "highlight markup is not aligned with the document"
            );
        }
        projection.reslice(per_line)
    }

    /// Gutter rows for projected lines `lines` (1-based, end exclusive).
    pub fn gutter<'a>(
        &self,
        lines: Range<usize>,
        diagnostics: &'a BTreeMap<usize, Vec<String>>,
    ) -> Vec<GutterRow<'a>> {
        let core = self.executor.core();
        gutter_rows(
            core.projection(),
            core.folding(),
            core.breakpoints(),
            diagnostics,
            lines,
        )
    }

    /// Gutter width for the current logical line count.
    pub fn gutter_width(&self) -> f32 {
        gutter_width(
            self.executor.core().document().line_count(),
            self.metrics.as_ref(),
        )
    }

    /// Minimap geometry for the current projection and scroll position.
    pub fn minimap(&self) -> MinimapGeometry {
        let core = self.executor.core();
        core.scroll()
            .minimap(core.projection().line_count(), self.metrics.as_ref())
    }

    /// Scroll position as a ratio in `[0, 1]`.
    pub fn scroll_ratio(&self) -> f32 {
        let core = self.executor.core();
        core.scroll().ratio(core.projection().line_count())
    }

    // Scroll control

    /// Set the number of lines the viewport shows.
    pub fn set_viewport_height(&mut self, lines: usize) {
        self.run_pending();
        self.executor.set_viewport_height(lines);
    }

    /// Scroll so projected line `line` (0-based) is at the top (clamped).
    pub fn set_scroll_top(&mut self, line: usize) {
        self.run_pending();
        self.executor.set_scroll_top(line);
    }

    /// Scroll to a minimap drag position in `[0, 1]` (clamped).
    pub fn scroll_to_minimap_ratio(&mut self, ratio: f32) {
        self.run_pending();
        self.executor.scroll_to_ratio(ratio);
    }

    fn observe(&self) -> Observed {
        let core = self.executor.core();
        Observed {
            version: core.document().version(),
            selection: core.selection(),
            fold_revision: core.folding().revision(),
            breakpoints: core.breakpoints().clone(),
        }
    }

    fn apply(&mut self, command: Command) -> CommandResult {
        let origin = match &command {
            Command::Edit(EditCommand::Undo) => ChangeOrigin::Undo,
            Command::Edit(EditCommand::Redo) => ChangeOrigin::Redo,
            Command::SetContent { .. } => ChangeOrigin::External,
            _ => ChangeOrigin::Edit,
        };

        let before = self.observe();
        let result = self.executor.execute(command);
        let after = self.observe();

        if after.version != before.version {
            self.emit(EditorEvent::DocumentChanged {
                text: self.text(),
                selection: after.selection,
                version: after.version,
                origin,
            });
        } else if after.selection != before.selection {
            self.emit(EditorEvent::SelectionChanged {
                selection: after.selection,
            });
        }
        if after.fold_revision != before.fold_revision {
            self.emit(EditorEvent::FoldingChanged {
                folded: self
                    .executor
                    .core()
                    .folding()
                    .folded()
                    .iter()
                    .copied()
                    .collect(),
            });
        }
        if after.breakpoints != before.breakpoints {
            self.emit(EditorEvent::BreakpointsChanged {
                lines: after.breakpoints.iter().collect(),
            });
        }

        result
    }

    fn emit(&mut self, event: EditorEvent) {
        for callback in &mut self.callbacks {
            callback(&event);
        }
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("executor", &self.executor)
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorded(session: &mut EditorSession) -> Arc<Mutex<Vec<EditorEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        session.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn test_queue_runs_in_order() {
        let mut session = EditorSession::new("", EditorConfig::default());
        let sender = session.command_sender();
        for text in ["a", "b"] {
            assert!(sender.send(Command::Edit(EditCommand::InsertText {
                text: text.to_string()
            })));
        }
        session.execute(Command::Edit(EditCommand::InsertText {
            text: "c".to_string(),
        }));
        assert_eq!(session.text(), "abc");
        assert_eq!(session.run_pending(), 0);
    }

    #[test]
    fn test_document_changed_carries_origin() {
        let mut session = EditorSession::new("x", EditorConfig::default());
        let events = recorded(&mut session);
        session.paste_at_cursor("y");
        session.do_undo();
        session.set_content("z");

        let origins: Vec<ChangeOrigin> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EditorEvent::DocumentChanged { origin, .. } => Some(*origin),
                _ => None,
            })
            .collect();
        assert_eq!(
            origins,
            vec![ChangeOrigin::Edit, ChangeOrigin::Undo, ChangeOrigin::External]
        );
    }

    #[test]
    fn test_callbacks_can_enqueue_follow_ups() {
        let mut session = EditorSession::new("", EditorConfig::default());
        let sender = session.command_sender();
        let mut fired = false;
        session.subscribe(move |event| {
            if matches!(event, EditorEvent::DocumentChanged { .. }) && !fired {
                fired = true;
                sender.send(Command::Edit(EditCommand::InsertText {
                    text: "!".to_string(),
                }));
            }
        });
        session.paste_at_cursor("hi");
        assert_eq!(session.text(), "hi!");
    }

    #[test]
    fn test_actions_and_keys() {
        let mut session = EditorSession::new("find me", EditorConfig::default());
        let events = recorded(&mut session);
        assert_eq!(session.handle_key("ctrl+a"), Some(CommandResult::Updated));
        assert_eq!(session.selection(), Selection::new(0, 7));
        session.handle_key("ctrl+f");
        session.handle_key("ctrl+s");
        assert_eq!(session.handle_key("ctrl+q"), None);
        assert_eq!(session.handle_key("ctrl+"), None);

        let events = events.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            &[
                EditorEvent::SelectionChanged {
                    selection: Selection::new(0, 7)
                },
                EditorEvent::SearchRequested {
                    query: "find me".to_string()
                },
                EditorEvent::SaveRequested,
            ]
        );
    }

    #[test]
    fn test_breakpoint_api() {
        let mut session = EditorSession::new("a\nb\nc", EditorConfig::default());
        let events = recorded(&mut session);
        assert!(session.toggle_breakpoint(2));
        assert!(!session.toggle_breakpoint(4));
        assert!(session.has_breakpoint(2));
        session.set_breakpoints([1, 3, 10]);
        assert_eq!(session.breakpoints(), vec![1, 3]);
        session.clear_breakpoints();
        assert!(session.breakpoints().is_empty());
        assert_eq!(events.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_minimap_and_gutter() {
        let text = (1..=120).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n");
        let mut session = EditorSession::new(&text, EditorConfig::default());
        session.set_viewport_height(20);
        assert_eq!(session.gutter_width(), 5.0);
        assert_eq!(session.scroll_ratio(), 0.0);

        session.scroll_to_minimap_ratio(0.5);
        assert_eq!(session.executor().core().scroll().scroll_top, 50);
        assert_eq!(session.scroll_ratio(), 0.5);
        let minimap = session.minimap();
        assert_eq!(minimap.content_height, 120.0);

        let diagnostics = BTreeMap::new();
        let rows = session.gutter(1..4, &diagnostics);
        assert_eq!(rows.iter().map(|row| row.logical_line).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
