//! Folded projection of a document.
//!
//! A [`Projection`] is the visible document: every logical line not hidden by a collapsed fold
//! region, in order, joined by `'\n'`. It carries the order-preserving mapping from projected
//! line numbers to logical line numbers (both 1-based) plus the start offset of every projected
//! line, which is what offset translation needs.
//!
//! Projections are rebuilt from scratch after every committed change and stamped with the
//! document version they were built from.

use crate::document::Document;
use crate::folding::FoldRegion;
use std::collections::BTreeSet;

/// The visible (folded) view of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Logical line number of each projected line, ascending.
    visible: Vec<usize>,
    /// Char offset of each projected line in `text`.
    line_starts: Vec<usize>,
    /// Byte offset of each projected line in `text`.
    byte_starts: Vec<usize>,
    text: String,
    char_len: usize,
    logical_line_count: usize,
    document_version: u64,
}

impl Projection {
    /// Build the projection of `document` given the collapsed anchors and fold regions.
    ///
    /// A logical line `L` is hidden iff some region `R` anchored in `folded` has
    /// `R.start_line < L <= R.end_line`. Collapsed ranges are swept in start order, so the cost
    /// is linear in the line count plus `O(k log k)` in the number of collapsed regions.
    pub fn build(document: &Document, folded: &BTreeSet<usize>, regions: &[FoldRegion]) -> Self {
        let mut hidden: Vec<(usize, usize)> = regions
            .iter()
            .filter(|region| {
                region.end_line > region.start_line && folded.contains(&region.start_line)
            })
            .map(|region| (region.start_line + 1, region.end_line))
            .collect();
        hidden.sort_unstable();

        let logical_line_count = document.line_count();
        let mut projection = Self {
            visible: Vec::with_capacity(logical_line_count),
            line_starts: Vec::with_capacity(logical_line_count),
            byte_starts: Vec::with_capacity(logical_line_count),
            text: String::with_capacity(document.char_len()),
            char_len: 0,
            logical_line_count,
            document_version: document.version(),
        };

        let mut pending = hidden.into_iter().peekable();
        let mut hidden_until = 0usize;

        for (idx, line_text) in document.lines().enumerate() {
            let line = idx + 1;
            while let Some((_, last_hidden)) =
                pending.next_if(|(first_hidden, _)| *first_hidden <= line)
            {
                hidden_until = hidden_until.max(last_hidden);
            }
            if line <= hidden_until {
                continue;
            }

            if !projection.visible.is_empty() {
                projection.text.push('\n');
                projection.char_len += 1;
            }
            projection.visible.push(line);
            projection.line_starts.push(projection.char_len);
            projection.byte_starts.push(projection.text.len());
            projection.text.push_str(&line_text);
            projection.char_len += line_text.chars().count();
        }

        tracing::trace!(
            visible = projection.visible.len(),
            logical = logical_line_count,
            "rebuilt projection"
        );
        projection
    }

    /// Document version this projection was built from.
    pub fn document_version(&self) -> u64 {
        self.document_version
    }

    /// Projected text (visible lines joined by `'\n'`).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character count of the projected text.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Number of visible lines.
    pub fn line_count(&self) -> usize {
        self.visible.len()
    }

    /// Number of logical lines in the source document.
    pub fn logical_line_count(&self) -> usize {
        self.logical_line_count
    }

    /// Mapping from projected line (index + 1) to logical line.
    pub fn mapping(&self) -> &[usize] {
        &self.visible
    }

    /// Visible lines in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.visible.len()).map(move |idx| self.line_text_at(idx))
    }

    /// Logical line shown at `projected_line`.
    pub fn logical_line(&self, projected_line: usize) -> Option<usize> {
        projected_line
            .checked_sub(1)
            .and_then(|idx| self.visible.get(idx).copied())
    }

    /// Projected line showing `logical_line`, or `None` if it is hidden or out of range.
    pub fn projected_line(&self, logical_line: usize) -> Option<usize> {
        self.visible
            .binary_search(&logical_line)
            .ok()
            .map(|idx| idx + 1)
    }

    /// Returns `true` if `logical_line` exists and is hidden by a collapsed region.
    pub fn is_hidden(&self, logical_line: usize) -> bool {
        logical_line >= 1
            && logical_line <= self.logical_line_count
            && self.visible.binary_search(&logical_line).is_err()
    }

    /// First projected line whose logical line is `>= logical_line`.
    pub fn first_visible_at_or_after(&self, logical_line: usize) -> Option<usize> {
        let idx = self.visible.partition_point(|line| *line < logical_line);
        (idx < self.visible.len()).then_some(idx + 1)
    }

    /// Char offset where `projected_line` starts in the projected text.
    pub fn line_start(&self, projected_line: usize) -> Option<usize> {
        projected_line
            .checked_sub(1)
            .and_then(|idx| self.line_starts.get(idx).copied())
    }

    /// Length in chars of `projected_line` (0 when out of range).
    pub fn line_len(&self, projected_line: usize) -> usize {
        let Some(idx) = projected_line.checked_sub(1) else {
            return 0;
        };
        let Some(start) = self.line_starts.get(idx) else {
            return 0;
        };
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.char_len);
        end - start
    }

    /// Text of `projected_line`.
    pub fn line_text(&self, projected_line: usize) -> Option<&str> {
        let idx = projected_line.checked_sub(1)?;
        (idx < self.visible.len()).then(|| self.line_text_at(idx))
    }

    /// Projected line containing the projected `offset` (clamped).
    pub fn line_of_offset(&self, offset: usize) -> usize {
        let offset = offset.min(self.char_len);
        self.line_starts
            .partition_point(|start| *start <= offset)
            .max(1)
    }

    /// Re-slice per-logical-line data (e.g. highlight markup) to the projection.
    ///
    /// `per_line[i]` belongs to logical line `i + 1`. The result has one entry per projected line;
    /// entries missing from `per_line` are `None`.
    pub fn reslice<'a, T>(&self, per_line: &'a [T]) -> Vec<Option<&'a T>> {
        self.visible
            .iter()
            .map(|line| per_line.get(line - 1))
            .collect()
    }

    fn line_text_at(&self, idx: usize) -> &str {
        let start = self.byte_starts[idx];
        let end = self
            .byte_starts
            .get(idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        &self.text[start..end]
    }
}
