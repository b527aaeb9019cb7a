//! Edit operation planning.
//!
//! Every text-changing command is first reduced to an [`EditOperation`]: one logical range
//! `[start, end)` replaced by one string, plus the selection to install afterwards. Planning is
//! pure (it only reads the document), which keeps the policies below testable on their own:
//!
//! - typed text and paste replace the selection, caret after the inserted text
//! - backspace/delete remove the selection, or one grapheme cluster next to the caret
//! - newline copies the current line's leading whitespace up to the caret
//! - tab inserts one indent unit at a caret, or shifts every touched line of a selection

use crate::document::Document;
use crate::selection::Selection;
use crate::text::{char_len, first_grapheme_len, last_grapheme_len};
use foldline_lang::{IndentConfig, leading_whitespace};
use std::ops::Range;

/// A single replacement in logical coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    /// Insert text at a caret.
    Insert {
        /// Insertion offset.
        at: usize,
        /// Inserted text.
        text: String,
    },
    /// Replace (or delete, when `text` is empty) a range.
    Replace {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Replacement text.
        text: String,
    },
    /// Indent or outdent a block of whole lines.
    IndentShift {
        /// Start of the first touched line.
        start: usize,
        /// End of the last touched line (before its `'\n'`).
        end: usize,
        /// The shifted lines.
        text: String,
        /// Selection after the shift.
        selection: Selection,
    },
    /// Line break followed by copied indentation.
    NewlineAutoIndent {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// `'\n'` plus the indentation prefix.
        text: String,
    },
}

impl EditOperation {
    /// Logical range being replaced.
    pub fn range(&self) -> Range<usize> {
        match self {
            Self::Insert { at, .. } => *at..*at,
            Self::Replace { start, end, .. }
            | Self::IndentShift { start, end, .. }
            | Self::NewlineAutoIndent { start, end, .. } => *start..*end,
        }
    }

    /// Replacement text.
    pub fn text(&self) -> &str {
        match self {
            Self::Insert { text, .. }
            | Self::Replace { text, .. }
            | Self::IndentShift { text, .. }
            | Self::NewlineAutoIndent { text, .. } => text,
        }
    }

    /// Selection to install once the operation is applied.
    pub fn selection_after(&self) -> Selection {
        match self {
            Self::IndentShift { selection, .. } => *selection,
            _ => Selection::caret(self.range().start + char_len(self.text())),
        }
    }

    /// Returns `true` if applying the operation cannot change the document.
    pub fn is_noop(&self) -> bool {
        self.range().is_empty() && self.text().is_empty()
    }
}

/// Map a pre-edit offset through the replacement of `range` by `inserted_len` chars.
///
/// Offsets before the range are unchanged and offsets at or after its end shift by the length
/// difference. An offset equal to `range.start` stays put, unless the edit is a pure insertion,
/// in which case it moves past the inserted text. Offsets strictly inside a removed range map
/// to `None`.
pub fn map_offset(offset: usize, range: Range<usize>, inserted_len: usize) -> Option<usize> {
    if offset < range.start {
        Some(offset)
    } else if offset == range.start {
        Some(if range.is_empty() {
            offset + inserted_len
        } else {
            offset
        })
    } else if offset < range.end {
        None
    } else {
        Some(offset - range.len() + inserted_len)
    }
}

/// Plans operations against one document state.
#[derive(Debug, Clone, Copy)]
pub struct EditPlanner<'a> {
    document: &'a Document,
    indent: &'a IndentConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    Indent,
    Outdent,
}

impl<'a> EditPlanner<'a> {
    /// Create a planner.
    pub fn new(document: &'a Document, indent: &'a IndentConfig) -> Self {
        Self { document, indent }
    }

    /// Replace the selection with `text` (typing and pasting).
    pub fn insert_text(&self, selection: Selection, text: &str) -> Option<EditOperation> {
        let range = self.document.clamp_range(selection.range());
        let op = if range.is_empty() {
            EditOperation::Insert {
                at: range.start,
                text: text.to_string(),
            }
        } else {
            EditOperation::Replace {
                start: range.start,
                end: range.end,
                text: text.to_string(),
            }
        };
        (!op.is_noop()).then_some(op)
    }

    /// Remove the selection, if any.
    pub fn delete_selection(&self, selection: Selection) -> Option<EditOperation> {
        let range = self.document.clamp_range(selection.range());
        (!range.is_empty()).then(|| EditOperation::Replace {
            start: range.start,
            end: range.end,
            text: String::new(),
        })
    }

    /// Backspace: the selection, or one grapheme cluster before the caret.
    pub fn backspace(&self, selection: Selection) -> Option<EditOperation> {
        if !selection.is_empty() {
            return self.delete_selection(selection);
        }
        let caret = selection.end.min(self.document.char_len());
        if caret == 0 {
            return None;
        }

        let (line, column) = self.document.offset_to_position(caret);
        let len = if column == 0 {
            1
        } else {
            let prefix: String = self
                .document
                .line_text(line)
                .unwrap_or_default()
                .chars()
                .take(column)
                .collect();
            last_grapheme_len(&prefix).max(1)
        };

        Some(EditOperation::Replace {
            start: caret - len,
            end: caret,
            text: String::new(),
        })
    }

    /// Forward delete: the selection, or one grapheme cluster after the caret.
    pub fn delete_forward(&self, selection: Selection) -> Option<EditOperation> {
        if !selection.is_empty() {
            return self.delete_selection(selection);
        }
        let caret = selection.end.min(self.document.char_len());
        if caret == self.document.char_len() {
            return None;
        }

        let (line, column) = self.document.offset_to_position(caret);
        let len = if column == self.document.line_len(line) {
            1
        } else {
            let suffix: String = self
                .document
                .line_text(line)
                .unwrap_or_default()
                .chars()
                .skip(column)
                .collect();
            first_grapheme_len(&suffix).max(1)
        };

        Some(EditOperation::Replace {
            start: caret,
            end: caret + len,
            text: String::new(),
        })
    }

    /// Enter: replace the selection with a line break plus the current line's indentation, cut
    /// off at the caret column.
    pub fn newline(&self, selection: Selection) -> Option<EditOperation> {
        let range = self.document.clamp_range(selection.range());
        let (line, column) = self.document.offset_to_position(range.start);
        let line_text = self.document.line_text(line).unwrap_or_default();

        let mut text = String::from("\n");
        text.extend(leading_whitespace(&line_text).chars().take(column));

        Some(EditOperation::NewlineAutoIndent {
            start: range.start,
            end: range.end,
            text,
        })
    }

    /// Tab: one indent unit at a caret, or indent every line touched by the selection.
    pub fn tab(&self, selection: Selection) -> Option<EditOperation> {
        if selection.is_empty() {
            let at = selection.end.min(self.document.char_len());
            return Some(EditOperation::Insert {
                at,
                text: self.indent.indent_unit(),
            });
        }
        self.shift_lines(selection, Shift::Indent)
    }

    /// Shift+Tab: outdent every line touched by the selection (the caret's line when empty).
    pub fn outdent(&self, selection: Selection) -> Option<EditOperation> {
        self.shift_lines(selection, Shift::Outdent)
    }

    fn shift_lines(&self, selection: Selection, shift: Shift) -> Option<EditOperation> {
        let document = self.document;
        let range = document.clamp_range(selection.range());
        let first = document.line_of_offset(range.start);
        let mut last = document.line_of_offset(range.end);
        if last > first && document.offset_to_position(range.end).1 == 0 {
            last -= 1;
        }

        let block_start = document.line_start(first)?;
        let block_end = document.line_start(last)? + document.line_len(last);

        // Per touched line: chars added (indent) or removed (outdent) at its start.
        let unit = self.indent.indent_unit();
        let mut text = String::new();
        let mut changes: Vec<usize> = Vec::with_capacity(last - first + 1);
        for line in first..=last {
            let line_text = document.line_text(line).unwrap_or_default();
            if line > first {
                text.push('\n');
            }
            match shift {
                Shift::Indent => {
                    text.push_str(&unit);
                    text.push_str(&line_text);
                    changes.push(self.indent.indent_width);
                }
                Shift::Outdent => {
                    let removed = self.indent.outdent_len(&line_text);
                    text.extend(line_text.chars().skip(removed));
                    changes.push(removed);
                }
            }
        }

        if shift == Shift::Outdent && changes.iter().all(|removed| *removed == 0) {
            return None;
        }

        let total: isize = changes
            .iter()
            .map(|n| match shift {
                Shift::Indent => *n as isize,
                Shift::Outdent => -(*n as isize),
            })
            .sum();

        let map_offset = |offset: usize| -> usize {
            if offset > block_end {
                return offset.saturating_add_signed(total);
            }
            let (line, column) = document.offset_to_position(offset);
            let idx = line - first;
            let before: isize = changes[..idx]
                .iter()
                .map(|n| match shift {
                    Shift::Indent => *n as isize,
                    Shift::Outdent => -(*n as isize),
                })
                .sum();
            let line_start = document
                .line_start(line)
                .unwrap_or(block_start)
                .saturating_add_signed(before);
            let column = match shift {
                Shift::Indent => column + changes[idx],
                Shift::Outdent => column.saturating_sub(changes[idx]),
            };
            line_start + column
        };

        Some(EditOperation::IndentShift {
            start: block_start,
            end: block_end,
            text,
            selection: selection.clamped(document.char_len()).map(map_offset),
        })
    }
}
