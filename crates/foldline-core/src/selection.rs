//! Selections and logical/projected offset translation.
//!
//! All mutation math happens in logical coordinates; the host only ever sees projected ones.
//! [`SelectionTranslator`] converts between the two using the current [`Projection`].
//!
//! Caret policy: a caret cannot rest inside a folded body. A logical offset on a hidden line
//! translates to the start of the nearest following visible line (or the end of the projected
//! text when no line follows).

use crate::document::Document;
use crate::projection::Projection;
use std::ops::Range;

/// A pair of character offsets. `start` may be greater than `end` for backward selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Anchor offset.
    pub start: usize,
    /// Active offset (the caret).
    pub end: usize,
}

impl Selection {
    /// Create a selection.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty selection (a caret) at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns `true` if the selection is a caret.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The selected range with ordered bounds.
    pub fn range(&self) -> Range<usize> {
        self.start.min(self.end)..self.start.max(self.end)
    }

    /// Clamp both endpoints to `len`.
    pub fn clamped(self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }

    /// Apply `f` to both endpoints.
    pub fn map(self, mut f: impl FnMut(usize) -> usize) -> Self {
        Self {
            start: f(self.start),
            end: f(self.end),
        }
    }
}

/// Converts offsets between a document and its projection.
#[derive(Debug, Clone, Copy)]
pub struct SelectionTranslator<'a> {
    document: &'a Document,
    projection: &'a Projection,
}

impl<'a> SelectionTranslator<'a> {
    /// Create a translator. `projection` must have been built from `document`'s current version.
    pub fn new(document: &'a Document, projection: &'a Projection) -> Self {
        debug_assert_eq!(
            document.version(),
            projection.document_version(),
            "projection is stale"
        );
        Self {
            document,
            projection,
        }
    }

    /// Translate a logical offset to a projected offset.
    pub fn logical_to_projected(&self, offset: usize) -> usize {
        let (line, column) = self.document.offset_to_position(offset);
        match self.projection.projected_line(line) {
            Some(projected) => {
                let start = self.projection.line_start(projected).unwrap_or(0);
                start + column.min(self.projection.line_len(projected))
            }
            None => self
                .projection
                .first_visible_at_or_after(line)
                .and_then(|projected| self.projection.line_start(projected))
                .unwrap_or(self.projection.char_len()),
        }
    }

    /// Translate a projected offset to a logical offset.
    pub fn projected_to_logical(&self, offset: usize) -> usize {
        let offset = offset.min(self.projection.char_len());
        let projected = self.projection.line_of_offset(offset);
        let column = offset - self.projection.line_start(projected).unwrap_or(0);
        let logical = self.projection.logical_line(projected).unwrap_or(1);
        self.document.position_to_offset(logical, column)
    }

    /// Translate a logical selection to projected coordinates.
    pub fn selection_to_projected(&self, selection: Selection) -> Selection {
        selection.map(|offset| self.logical_to_projected(offset))
    }

    /// Translate a projected selection to logical coordinates.
    pub fn selection_to_logical(&self, selection: Selection) -> Selection {
        selection.map(|offset| self.projected_to_logical(offset))
    }

    /// Move logical offsets that sit inside a folded body to where the caret policy puts them.
    pub fn snap_logical(&self, selection: Selection) -> Selection {
        self.selection_to_logical(self.selection_to_projected(selection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folding::detect_foldable_regions;
    use foldline_lang::IndentConfig;

    fn fixture(text: &str, folded: &[usize]) -> (Document, Projection) {
        let doc = Document::new(text);
        let regions = detect_foldable_regions(text, &IndentConfig::default());
        let projection = Projection::build(&doc, &folded.iter().copied().collect(), &regions);
        (doc, projection)
    }

    #[test]
    fn test_identity_without_folds() {
        let (doc, projection) = fixture("ab\ncd", &[]);
        let translator = SelectionTranslator::new(&doc, &projection);
        for offset in 0..=doc.char_len() {
            assert_eq!(translator.logical_to_projected(offset), offset);
            assert_eq!(translator.projected_to_logical(offset), offset);
        }
    }

    #[test]
    fn test_offsets_after_fold_shift() {
        // "if x:\n    y()\n    z()\nw()": 'w' is at logical offset 22, projected offset 6.
        let (doc, projection) = fixture("if x:\n    y()\n    z()\nw()", &[1]);
        let translator = SelectionTranslator::new(&doc, &projection);
        assert_eq!(translator.logical_to_projected(22), 6);
        assert_eq!(translator.projected_to_logical(6), 22);
        assert_eq!(translator.logical_to_projected(5), 5);
        assert_eq!(translator.projected_to_logical(5), 5);
    }

    #[test]
    fn test_hidden_offset_snaps_to_next_visible_line() {
        let (doc, projection) = fixture("if x:\n    y()\n    z()\nw()", &[1]);
        let translator = SelectionTranslator::new(&doc, &projection);
        assert_eq!(translator.logical_to_projected(8), 6);
        assert_eq!(translator.snap_logical(Selection::caret(8)), Selection::caret(22));
    }

    #[test]
    fn test_hidden_tail_snaps_to_end() {
        let (doc, projection) = fixture("a\n  b\n  c", &[1]);
        let translator = SelectionTranslator::new(&doc, &projection);
        assert_eq!(projection.text(), "a");
        assert_eq!(translator.logical_to_projected(5), 1);
    }

    #[test]
    fn test_stale_offsets_are_clamped() {
        let (doc, projection) = fixture("abc", &[]);
        let translator = SelectionTranslator::new(&doc, &projection);
        assert_eq!(translator.projected_to_logical(500), 3);
        assert_eq!(translator.logical_to_projected(500), 3);
        assert_eq!(Selection::new(9, 2).clamped(3), Selection::new(3, 2));
        assert_eq!(Selection::new(9, 2).range(), 2..9);
    }
}
