//! Gutter rows.

use crate::breakpoints::Breakpoints;
use crate::folding::FoldEngine;
use crate::projection::Projection;
use std::collections::BTreeMap;
use std::ops::Range;

/// Fold marker shown next to a region anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoldMarker {
    /// The region is expanded.
    Expanded,
    /// The region is collapsed.
    Collapsed,
}

/// Gutter data for one visible line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GutterRow<'a> {
    /// Projected line number (1-based).
    pub projected_line: usize,
    /// Logical line number (1-based), the number shown to the user.
    pub logical_line: usize,
    /// Fold marker, when the line anchors a region.
    pub fold_marker: Option<FoldMarker>,
    /// Whether a breakpoint is set on the line.
    pub breakpoint: bool,
    /// Diagnostics attached to the line.
    pub diagnostics: &'a [String],
}

/// Build gutter rows for the projected lines in `lines` (1-based, clamped to the projection).
pub fn gutter_rows<'a>(
    projection: &Projection,
    folding: &FoldEngine,
    breakpoints: &Breakpoints,
    diagnostics: &'a BTreeMap<usize, Vec<String>>,
    lines: Range<usize>,
) -> Vec<GutterRow<'a>> {
    let start = lines.start.max(1);
    let end = lines.end.min(projection.line_count() + 1);
    (start..end)
        .filter_map(|projected_line| {
            let logical_line = projection.logical_line(projected_line)?;
            let fold_marker = folding.region_at(logical_line).map(|_| {
                if folding.is_folded(logical_line) {
                    FoldMarker::Collapsed
                } else {
                    FoldMarker::Expanded
                }
            });
            Some(GutterRow {
                projected_line,
                logical_line,
                fold_marker,
                breakpoint: breakpoints.contains(logical_line),
                diagnostics: diagnostics
                    .get(&logical_line)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use foldline_lang::IndentConfig;

    #[test]
    fn test_rows_follow_projection() {
        let doc = Document::new("if x:\n    y()\n    z()\nw()");
        let mut folding = FoldEngine::new(&doc, IndentConfig::default(), 10);
        folding.toggle_fold(1);
        let projection = Projection::build(&doc, folding.folded(), folding.regions());

        let mut breakpoints = Breakpoints::new();
        breakpoints.set([4], 4);
        let diagnostics = BTreeMap::from([(4, vec!["unused".to_string()])]);

        let rows = gutter_rows(&projection, &folding, &breakpoints, &diagnostics, 1..10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].logical_line, 1);
        assert_eq!(rows[0].fold_marker, Some(FoldMarker::Collapsed));
        assert!(rows[0].diagnostics.is_empty());
        assert_eq!(rows[1].projected_line, 2);
        assert_eq!(rows[1].logical_line, 4);
        assert_eq!(rows[1].fold_marker, None);
        assert!(rows[1].breakpoint);
        assert_eq!(rows[1].diagnostics, ["unused".to_string()]);
    }
}
