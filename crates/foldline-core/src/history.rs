//! Undo/redo history.
//!
//! Entries are complete snapshots of the document, the selection, the collapsed anchors, the
//! breakpoints and the scroll position. Rope snapshots share structure, so a snapshot per command
//! stays cheap. Line-anchored state is captured as is, never mapped back through the edit.

use crate::breakpoints::Breakpoints;
use crate::document::DocumentSnapshot;
use crate::metrics::ScrollState;
use crate::selection::Selection;
use std::collections::{BTreeSet, VecDeque};

/// Default maximum undo depth.
pub const DEFAULT_MAX_UNDO: usize = 1000;

/// One restorable editor state.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    /// Document text.
    pub document: DocumentSnapshot,
    /// Logical selection.
    pub selection: Selection,
    /// Collapsed fold anchors.
    pub folded: BTreeSet<usize>,
    /// Breakpoint lines.
    pub breakpoints: Breakpoints,
    /// Scroll position at the time the entry was taken.
    pub scroll: ScrollState,
}

/// Undo and redo stacks.
#[derive(Debug)]
pub struct HistoryManager {
    undo_stack: VecDeque<UndoEntry>,
    redo_stack: VecDeque<UndoEntry>,
    max_undo: usize,
}

impl HistoryManager {
    /// Create a history bounded to `max_undo` entries per stack.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_undo: max_undo.max(1),
        }
    }

    /// Record the state before a new edit. Clears the redo stack.
    pub fn record(&mut self, entry: UndoEntry) {
        self.redo_stack.clear();
        Self::push_bounded(&mut self.undo_stack, entry, self.max_undo);
    }

    /// Pop the most recent undo entry, moving `current` onto the redo stack.
    ///
    /// Returns `None` (and leaves `current` unused) when there is nothing to undo.
    pub fn undo(&mut self, current: UndoEntry) -> Option<UndoEntry> {
        let entry = self.undo_stack.pop_back()?;
        Self::push_bounded(&mut self.redo_stack, current, self.max_undo);
        Some(entry)
    }

    /// Pop the most recent redo entry, moving `current` onto the undo stack.
    pub fn redo(&mut self, current: UndoEntry) -> Option<UndoEntry> {
        let entry = self.redo_stack.pop_back()?;
        Self::push_bounded(&mut self.undo_stack, current, self.max_undo);
        Some(entry)
    }

    /// Returns `true` if undo is possible.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if redo is possible.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo stack depth.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Redo stack depth.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_bounded(stack: &mut VecDeque<UndoEntry>, entry: UndoEntry, max: usize) {
        stack.push_back(entry);
        while stack.len() > max {
            stack.pop_front();
        }
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn entry(text: &str) -> UndoEntry {
        UndoEntry {
            document: Document::new(text).snapshot(),
            selection: Selection::caret(0),
            folded: BTreeSet::new(),
            breakpoints: Breakpoints::new(),
            scroll: ScrollState::default(),
        }
    }

    #[test]
    fn test_undo_redo_move_between_stacks() {
        let mut history = HistoryManager::default();
        history.record(entry("a"));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        let undone = history.undo(entry("ab")).unwrap();
        assert_eq!(undone.document.text(), "a");
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 1);

        let redone = history.redo(entry("a")).unwrap();
        assert_eq!(redone.document.text(), "ab");
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = HistoryManager::default();
        assert!(history.undo(entry("x")).is_none());
        assert!(history.redo(entry("x")).is_none());
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(history.undo_depth(), 0);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = HistoryManager::default();
        history.record(entry("a"));
        history.undo(entry("b"));
        assert!(history.can_redo());
        history.record(entry("a"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut history = HistoryManager::new(3);
        for text in ["1", "2", "3", "4", "5"] {
            history.record(entry(text));
        }
        assert_eq!(history.undo_depth(), 3);
        let oldest_kept = (0..3)
            .filter_map(|_| history.undo(entry("now")))
            .last()
            .unwrap();
        assert_eq!(oldest_kept.document.text(), "3");
    }
}
