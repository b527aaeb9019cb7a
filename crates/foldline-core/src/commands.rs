//! Command Interface Layer
//!
//! Every mutation of the editor goes through [`CommandExecutor::execute`]. A command is one
//! atomic step: it plans an [`EditOperation`] in logical coordinates, snapshots the prior state
//! for undo, applies the replacement, carries fold regions, collapsed anchors and breakpoints
//! across it, and finally rebuilds the projection. When `execute` returns, document, projection
//! and selection are consistent again.
//!
//! # Example
//!
//! ```rust
//! use foldline_core::{Command, CommandExecutor, EditCommand, EditorConfig};
//!
//! let mut executor = CommandExecutor::new("if x:\n    y()", EditorConfig::default());
//! executor.execute(Command::Edit(EditCommand::SetSelection { start: 13, end: 13 }));
//! executor.execute(Command::Edit(EditCommand::InsertNewline));
//! assert_eq!(executor.core().text(), "if x:\n    y()\n    ");
//!
//! executor.execute(Command::Edit(EditCommand::Undo));
//! assert_eq!(executor.core().text(), "if x:\n    y()");
//! ```

use crate::breakpoints::Breakpoints;
use crate::clipboard::ClipboardBridge;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::edit::{EditOperation, EditPlanner, map_offset};
use crate::folding::{FoldEngine, LineEdit};
use crate::history::{HistoryManager, UndoEntry};
use crate::metrics::ScrollState;
use crate::projection::Projection;
use crate::selection::{Selection, SelectionTranslator};
use crate::text::{char_len, count_newlines};
use std::collections::BTreeMap;

/// Text editing commands. Offsets are projected (what the host sees).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Type text over the selection.
    InsertText {
        /// Text to insert.
        text: String,
    },
    /// Delete the selection or the grapheme before the caret.
    Backspace,
    /// Delete the selection or the grapheme after the caret.
    DeleteForward,
    /// Line break with auto-indent.
    InsertNewline,
    /// Indent (one unit at a caret, whole lines for a selection).
    Tab,
    /// Outdent the lines touched by the selection.
    Outdent,
    /// Copy the selection to the clipboard and delete it.
    Cut,
    /// Copy the selection to the clipboard.
    Copy,
    /// Paste host-supplied text over the selection.
    Paste {
        /// Text to paste.
        text: String,
    },
    /// Paste the clipboard contents over the selection.
    PasteFromClipboard,
    /// Select the whole document.
    SelectAll,
    /// Set the selection from projected offsets.
    SetSelection {
        /// Anchor offset (projected).
        start: usize,
        /// Caret offset (projected).
        end: usize,
    },
    /// Undo the last edit.
    Undo,
    /// Redo the last undone edit.
    Redo,
}

/// Folding commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldCommand {
    /// Flip the region anchored at a logical line.
    Toggle {
        /// Anchor line (1-based).
        line: usize,
    },
    /// Collapse every region.
    FoldAll,
    /// Expand every region.
    UnfoldAll,
}

/// Breakpoint commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointCommand {
    /// Flip the breakpoint on a logical line.
    Toggle {
        /// Line (1-based).
        line: usize,
    },
    /// Replace the whole breakpoint set.
    Replace {
        /// New breakpoint lines (1-based).
        lines: Vec<usize>,
    },
    /// Remove every breakpoint.
    Clear,
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text editing commands
    Edit(EditCommand),
    /// Folding commands
    Fold(FoldCommand),
    /// Breakpoint commands
    Breakpoint(BreakpointCommand),
    /// Replace the whole document (undoable).
    SetContent {
        /// New text.
        text: String,
    },
    /// Reveal a logical line (1-based), unfolding whatever hides it, and put the caret there.
    JumpToLine {
        /// Target line.
        line: usize,
    },
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The document changed.
    Edited,
    /// Selection, folds, breakpoints or scroll changed; the document did not.
    Updated,
    /// The command was valid but changed nothing.
    Unchanged,
    /// The command referred to something that does not exist (out-of-range line, non-anchor).
    Rejected,
    /// The selection was copied.
    Copied(String),
}

impl CommandResult {
    /// Returns `true` if the document text changed.
    pub fn is_edit(&self) -> bool {
        matches!(self, CommandResult::Edited)
    }
}

/// Editor state: document, folds, projection, selection, breakpoints and scroll position.
///
/// Read access is public; mutation only happens through [`CommandExecutor`].
#[derive(Debug, Clone)]
pub struct EditorCore {
    document: Document,
    folding: FoldEngine,
    projection: Projection,
    /// Logical selection.
    selection: Selection,
    breakpoints: Breakpoints,
    scroll: ScrollState,
}

impl EditorCore {
    /// Create editor state for `text`.
    pub fn new(text: &str, config: &EditorConfig) -> Self {
        let document = Document::new(text);
        let folding = FoldEngine::new(&document, config.indent, config.fold_recompute_drift);
        let projection = Projection::build(&document, folding.folded(), folding.regions());
        Self {
            document,
            folding,
            projection,
            selection: Selection::default(),
            breakpoints: Breakpoints::new(),
            scroll: ScrollState::default(),
        }
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.document.text()
    }

    /// Fold regions and collapsed anchors.
    pub fn folding(&self) -> &FoldEngine {
        &self.folding
    }

    /// Current projection.
    pub fn projection(&self) -> &Projection {
        debug_assert_eq!(self.projection.document_version(), self.document.version());
        &self.projection
    }

    /// Translator between logical and projected offsets.
    pub fn translator(&self) -> SelectionTranslator<'_> {
        SelectionTranslator::new(&self.document, &self.projection)
    }

    /// Selection in logical coordinates.
    pub fn logical_selection(&self) -> Selection {
        self.selection
    }

    /// Selection in projected coordinates.
    pub fn selection(&self) -> Selection {
        self.translator().selection_to_projected(self.selection)
    }

    /// Breakpoints.
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// Scroll position.
    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    /// Selected logical text.
    pub fn selected_text(&self) -> String {
        self.document.slice(self.selection.range())
    }

    fn undo_entry(&self) -> UndoEntry {
        UndoEntry {
            document: self.document.snapshot(),
            selection: self.selection,
            folded: self.folding.folded().clone(),
            breakpoints: self.breakpoints.clone(),
            scroll: self.scroll,
        }
    }

    fn apply_operation(&mut self, op: &EditOperation) {
        let range = self.document.clamp_range(op.range());
        let text = op.text();
        let inserted_len = char_len(text);

        let edit = LineEdit {
            start_line: self.document.line_of_offset(range.start),
            end_line: self.document.line_of_offset(range.end),
            line_delta: count_newlines(text) as isize
                - self.document.count_newlines(range.clone()) as isize,
        };

        // Pre-edit line starts of everything anchored to a line.
        let anchored_lines: BTreeMap<usize, usize> = self
            .folding
            .folded()
            .iter()
            .copied()
            .chain(self.breakpoints.iter())
            .filter_map(|line| Some((line, self.document.line_start(line)?)))
            .collect();

        self.folding.begin_edit();
        self.document.replace(range.clone(), text);

        let document = &self.document;
        let remap = |line: usize| {
            let start = *anchored_lines.get(&line)?;
            map_offset(start, range.clone(), inserted_len)
                .map(|offset| document.line_of_offset(offset))
        };
        self.folding.apply_edit(edit, remap);
        self.breakpoints.remap(remap);
        self.folding.end_edit(&self.document);
        self.breakpoints.clamp(self.document.line_count());

        tracing::debug!(
            start = range.start,
            end = range.end,
            inserted = inserted_len,
            line_delta = edit.line_delta,
            version = self.document.version(),
            "applied edit"
        );

        self.finish_edit(op.selection_after());
    }

    fn restore(&mut self, entry: UndoEntry) {
        self.document.restore(entry.document);
        self.folding.restore_folded(entry.folded);
        self.folding.request_recompute();
        self.folding.sync(&self.document);
        self.breakpoints = entry.breakpoints;
        self.breakpoints.clamp(self.document.line_count());
        self.scroll = entry.scroll;
        self.finish_edit_keep_scroll(entry.selection);
    }

    fn set_content(&mut self, text: &str) {
        self.document.set_text(text);
        self.folding.unfold_all();
        self.folding.request_recompute();
        self.folding.sync(&self.document);
        self.breakpoints.clamp(self.document.line_count());
        self.finish_edit(self.selection);
    }

    /// Install `selection` after a document change: folds hiding the caret open up, the caret
    /// is scrolled into view.
    fn finish_edit(&mut self, selection: Selection) {
        self.finish_edit_keep_scroll(selection);
        self.reveal_caret();
    }

    fn finish_edit_keep_scroll(&mut self, selection: Selection) {
        let selection = selection.clamped(self.document.char_len());
        let caret_line = self.document.line_of_offset(selection.end);
        self.folding.unfold_containing(caret_line);
        self.rebuild_projection();
        self.selection = self.translator().snap_logical(selection);
    }

    /// Rebuild the projection after a fold change and move the selection out of hidden lines.
    fn refresh_view(&mut self) {
        self.rebuild_projection();
        self.selection = self.translator().snap_logical(self.selection);
    }

    fn rebuild_projection(&mut self) {
        self.projection = Projection::build(
            &self.document,
            self.folding.folded(),
            self.folding.regions(),
        );
        self.scroll = self.scroll.clamped(self.projection.line_count());
    }

    fn reveal_caret(&mut self) {
        let caret = self.translator().logical_to_projected(self.selection.end);
        let line = self.projection.line_of_offset(caret);
        self.scroll = self
            .scroll
            .reveal(line - 1, self.projection.line_count());
    }

    fn set_logical_selection(&mut self, selection: Selection) -> CommandResult {
        let selection = self
            .translator()
            .snap_logical(selection.clamped(self.document.char_len()));
        if selection == self.selection {
            return CommandResult::Unchanged;
        }
        self.selection = selection;
        self.reveal_caret();
        CommandResult::Updated
    }

    fn jump_to_line(&mut self, line: usize) -> CommandResult {
        let Some(start) = self.document.line_start(line) else {
            return CommandResult::Rejected;
        };
        let unfolded = self.folding.unfold_containing(line);
        if unfolded {
            self.rebuild_projection();
        }
        let scroll = self.scroll;
        let selected = self.set_logical_selection(Selection::caret(start));
        if selected == CommandResult::Unchanged {
            self.reveal_caret();
        }
        if unfolded || selected != CommandResult::Unchanged || scroll != self.scroll {
            CommandResult::Updated
        } else {
            CommandResult::Unchanged
        }
    }

    fn set_viewport_height(&mut self, lines: usize) {
        self.scroll = ScrollState {
            viewport_height: lines,
            ..self.scroll
        }
        .clamped(self.projection.line_count());
    }

    fn set_scroll_top(&mut self, line: usize) {
        self.scroll = ScrollState {
            scroll_top: line,
            ..self.scroll
        }
        .clamped(self.projection.line_count());
    }
}

/// Executes commands against an [`EditorCore`] and keeps the undo history.
///
/// # Example
///
/// ```rust
/// use foldline_core::{Command, CommandExecutor, EditCommand, EditorConfig, FoldCommand};
///
/// let text = "if x:\n    y()\n    z()\nw()";
/// let mut executor = CommandExecutor::new(text, EditorConfig::default());
/// executor.execute(Command::Fold(FoldCommand::Toggle { line: 1 }));
/// assert_eq!(executor.core().projection().text(), "if x:\nw()");
/// ```
#[derive(Debug)]
pub struct CommandExecutor {
    core: EditorCore,
    history: HistoryManager,
    clipboard: ClipboardBridge,
    config: EditorConfig,
}

impl CommandExecutor {
    /// Create an executor with an in-memory clipboard.
    pub fn new(text: &str, config: EditorConfig) -> Self {
        Self::with_clipboard(text, config, ClipboardBridge::default())
    }

    /// Create an executor with an explicit clipboard.
    pub fn with_clipboard(text: &str, config: EditorConfig, clipboard: ClipboardBridge) -> Self {
        Self {
            core: EditorCore::new(text, &config),
            history: HistoryManager::new(config.max_undo),
            clipboard,
            config,
        }
    }

    /// Editor state.
    pub fn core(&self) -> &EditorCore {
        &self.core
    }

    /// Active configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Undo history.
    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Execute one command.
    pub fn execute(&mut self, command: Command) -> CommandResult {
        tracing::debug!(?command, "executing command");
        match command {
            Command::Edit(edit) => self.execute_edit(edit),
            Command::Fold(fold) => self.execute_fold(fold),
            Command::Breakpoint(breakpoint) => self.execute_breakpoint(breakpoint),
            Command::SetContent { text } => {
                if text == self.core.text() {
                    return CommandResult::Unchanged;
                }
                let entry = self.core.undo_entry();
                self.core.set_content(&text);
                self.history.record(entry);
                CommandResult::Edited
            }
            Command::JumpToLine { line } => self.core.jump_to_line(line),
        }
    }

    /// Execute commands in order.
    pub fn execute_batch(&mut self, commands: Vec<Command>) -> Vec<CommandResult> {
        commands
            .into_iter()
            .map(|command| self.execute(command))
            .collect()
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Set the number of lines that fit in the viewport.
    pub fn set_viewport_height(&mut self, lines: usize) {
        self.core.set_viewport_height(lines);
    }

    /// Scroll so that projected line `line` (0-based) is at the top, clamped.
    pub fn set_scroll_top(&mut self, line: usize) {
        self.core.set_scroll_top(line);
    }

    /// Scroll to a ratio in `[0, 1]` of the scrollable range (minimap drag).
    pub fn scroll_to_ratio(&mut self, ratio: f32) {
        let line_count = self.core.projection.line_count();
        let target = self.core.scroll.target_for_ratio(ratio, line_count);
        self.core.set_scroll_top(target);
    }

    fn execute_edit(&mut self, command: EditCommand) -> CommandResult {
        let planner = EditPlanner::new(&self.core.document, &self.config.indent);
        let selection = self.core.selection;

        let op = match command {
            EditCommand::InsertText { text } | EditCommand::Paste { text } => {
                planner.insert_text(selection, &text)
            }
            EditCommand::Backspace => planner.backspace(selection),
            EditCommand::DeleteForward => planner.delete_forward(selection),
            EditCommand::InsertNewline => planner.newline(selection),
            EditCommand::Tab => planner.tab(selection),
            EditCommand::Outdent => planner.outdent(selection),
            EditCommand::Cut => {
                if selection.is_empty() {
                    return CommandResult::Unchanged;
                }
                if !self.clipboard.copy(&self.core.selected_text()) {
                    tracing::warn!("cut aborted: no clipboard accepted the selection");
                    return CommandResult::Unchanged;
                }
                planner.delete_selection(selection)
            }
            EditCommand::Copy => {
                if selection.is_empty() {
                    return CommandResult::Unchanged;
                }
                let text = self.core.selected_text();
                return if self.clipboard.copy(&text) {
                    CommandResult::Copied(text)
                } else {
                    CommandResult::Unchanged
                };
            }
            EditCommand::PasteFromClipboard => match self.clipboard.paste() {
                Some(text) => planner.insert_text(selection, &text),
                None => return CommandResult::Unchanged,
            },
            EditCommand::SelectAll => {
                let len = self.core.document.char_len();
                return self.core.set_logical_selection(Selection::new(0, len));
            }
            EditCommand::SetSelection { start, end } => {
                let logical = self
                    .core
                    .translator()
                    .selection_to_logical(Selection::new(start, end));
                return self.core.set_logical_selection(logical);
            }
            EditCommand::Undo => return self.undo(),
            EditCommand::Redo => return self.redo(),
        };

        match op {
            Some(op) => self.commit(op),
            None => CommandResult::Unchanged,
        }
    }

    fn commit(&mut self, op: EditOperation) -> CommandResult {
        let entry = self.core.undo_entry();
        self.core.apply_operation(&op);
        self.history.record(entry);
        CommandResult::Edited
    }

    fn undo(&mut self) -> CommandResult {
        let current = self.core.undo_entry();
        match self.history.undo(current) {
            Some(entry) => {
                self.core.restore(entry);
                CommandResult::Edited
            }
            None => CommandResult::Unchanged,
        }
    }

    fn redo(&mut self) -> CommandResult {
        let current = self.core.undo_entry();
        match self.history.redo(current) {
            Some(entry) => {
                self.core.restore(entry);
                CommandResult::Edited
            }
            None => CommandResult::Unchanged,
        }
    }

    fn execute_fold(&mut self, command: FoldCommand) -> CommandResult {
        let changed = match command {
            FoldCommand::Toggle { line } => {
                if !self.core.folding.toggle_fold(line) {
                    return CommandResult::Rejected;
                }
                true
            }
            FoldCommand::FoldAll => self.core.folding.fold_all(),
            FoldCommand::UnfoldAll => self.core.folding.unfold_all(),
        };
        if !changed {
            return CommandResult::Unchanged;
        }
        self.core.refresh_view();
        CommandResult::Updated
    }

    fn execute_breakpoint(&mut self, command: BreakpointCommand) -> CommandResult {
        let line_count = self.core.document.line_count();
        let breakpoints = &mut self.core.breakpoints;
        let changed = match command {
            BreakpointCommand::Toggle { line } => {
                if !breakpoints.toggle(line, line_count) {
                    return CommandResult::Rejected;
                }
                true
            }
            BreakpointCommand::Replace { lines } => breakpoints.set(lines, line_count),
            BreakpointCommand::Clear => breakpoints.clear(),
        };
        if changed {
            CommandResult::Updated
        } else {
            CommandResult::Unchanged
        }
    }
}
