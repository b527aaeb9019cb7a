//! Indentation-based code folding.
//!
//! Fold regions are detected with a language-agnostic indentation heuristic: a non-blank line
//! followed by more deeply indented lines opens a block that runs until indentation drops back.
//! This deliberately over- or under-approximates blocks in languages that are not
//! indentation-delimited.
//!
//! Line numbers are 1-based and regions are inclusive. A collapsed region keeps its anchor
//! (`start_line`) visible and hides `start_line + 1 ..= end_line`.
//!
//! Regions are kept up to date incrementally across edits (see [`adjust_regions_for_edit`]) and
//! fully recomputed when an edit touches an existing region, after history navigation, or when the
//! line count has drifted too far since the last full pass.

use crate::document::Document;
use crate::text::split_lines;
use foldline_lang::{IndentConfig, is_blank};
use std::collections::BTreeSet;

/// Default line-count drift that triggers a full region recompute.
pub const DEFAULT_RECOMPUTE_DRIFT: usize = 10;

/// Heuristic category of a fold region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FoldKind {
    /// An indentation block.
    Block,
}

/// A foldable logical line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FoldRegion {
    /// Anchor line (1-based). Stays visible when collapsed.
    pub start_line: usize,
    /// Last line of the region (1-based, inclusive).
    pub end_line: usize,
    /// Heuristic category.
    pub kind: FoldKind,
}

impl FoldRegion {
    /// Create a block region.
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
            kind: FoldKind::Block,
        }
    }

    /// Returns `true` if collapsing this region hides `line`.
    pub fn hides_line(&self, line: usize) -> bool {
        line > self.start_line && line <= self.end_line
    }

    /// Returns `true` if the region intersects the inclusive line span.
    pub fn overlaps(&self, start_line: usize, end_line: usize) -> bool {
        self.start_line <= end_line && self.end_line >= start_line
    }

    /// Number of lines hidden when collapsed.
    pub fn hidden_line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line)
    }
}

/// Detect foldable regions in `text`.
///
/// Regions are returned sorted by start line; every start line is unique.
pub fn detect_foldable_regions(text: &str, indent: &IndentConfig) -> Vec<FoldRegion> {
    let indents: Vec<Option<usize>> = split_lines(text)
        .map(|line| (!is_blank(line)).then(|| indent.indent_width_of(line)))
        .collect();

    // next_non_blank[i]: first non-blank line index strictly after i.
    let mut next_non_blank = vec![None; indents.len()];
    let mut next = None;
    for idx in (0..indents.len()).rev() {
        next_non_blank[idx] = next;
        if indents[idx].is_some() {
            next = Some(idx);
        }
    }

    let mut regions = Vec::new();
    for (idx, width) in indents.iter().enumerate() {
        let Some(width) = *width else {
            continue;
        };
        let Some(first) = next_non_blank[idx] else {
            break;
        };
        if indents[first].is_none_or(|w| w <= width) {
            continue;
        }

        let mut last_greater = idx;
        let mut cursor = Some(first);
        while let Some(line) = cursor {
            match indents[line] {
                Some(w) if w > width => {
                    last_greater = line;
                    cursor = next_non_blank[line];
                }
                _ => break,
            }
        }

        if last_greater > idx {
            regions.push(FoldRegion::new(idx + 1, last_greater + 1));
        }
    }

    regions
}

/// Result of shifting regions across an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionAdjustment {
    /// Regions after the shift.
    pub regions: Vec<FoldRegion>,
    /// Whether any region overlapped the edited span (the caller must force a recompute).
    pub overlapped: bool,
}

/// Shift regions across an edit touching logical lines `edit_start_line ..= edit_end_line`
/// (pre-edit numbering) that changed the line count by `line_delta`.
///
/// Regions ending before the span pass through, regions starting after it move by `line_delta`,
/// and overlapping regions are left untouched but reported.
pub fn adjust_regions_for_edit(
    regions: &[FoldRegion],
    edit_start_line: usize,
    edit_end_line: usize,
    line_delta: isize,
) -> RegionAdjustment {
    let mut overlapped = false;
    let regions = regions
        .iter()
        .map(|region| {
            if region.end_line < edit_start_line {
                *region
            } else if region.start_line > edit_end_line {
                FoldRegion {
                    start_line: region.start_line.saturating_add_signed(line_delta),
                    end_line: region.end_line.saturating_add_signed(line_delta),
                    kind: region.kind,
                }
            } else {
                overlapped = true;
                *region
            }
        })
        .collect();

    RegionAdjustment {
        regions,
        overlapped,
    }
}

/// Line-level summary of one edit, in pre-edit numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEdit {
    /// First line touched by the edit.
    pub start_line: usize,
    /// Last line touched by the edit.
    pub end_line: usize,
    /// Net change in line count.
    pub line_delta: isize,
}

/// Foldable regions plus the set of collapsed anchors.
#[derive(Debug, Clone)]
pub struct FoldEngine {
    regions: Vec<FoldRegion>,
    folded: BTreeSet<usize>,
    indent: IndentConfig,
    recompute_drift: usize,
    computed_line_count: usize,
    force_recompute: bool,
    mid_edit: bool,
    revision: u64,
}

impl FoldEngine {
    /// Create an engine and detect regions for `document`.
    pub fn new(document: &Document, indent: IndentConfig, recompute_drift: usize) -> Self {
        let mut engine = Self {
            regions: Vec::new(),
            folded: BTreeSet::new(),
            indent,
            recompute_drift: recompute_drift.max(1),
            computed_line_count: 0,
            force_recompute: false,
            mid_edit: false,
            revision: 0,
        };
        engine.recompute(document);
        engine
    }

    /// All regions, sorted by start line.
    pub fn regions(&self) -> &[FoldRegion] {
        &self.regions
    }

    /// The region anchored at `line`, if any.
    pub fn region_at(&self, line: usize) -> Option<&FoldRegion> {
        self.regions
            .binary_search_by_key(&line, |region| region.start_line)
            .ok()
            .map(|idx| &self.regions[idx])
    }

    /// Collapsed anchor lines.
    pub fn folded(&self) -> &BTreeSet<usize> {
        &self.folded
    }

    /// Returns `true` if the region anchored at `line` is collapsed.
    pub fn is_folded(&self, line: usize) -> bool {
        self.folded.contains(&line)
    }

    /// Counter bumped whenever the regions or the collapsed set change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` if a full recompute is pending.
    pub fn recompute_pending(&self) -> bool {
        self.force_recompute
    }

    /// Flip the collapsed state of the region anchored at `line`.
    ///
    /// Returns `false` (and does nothing) when `line` is not an anchor. Only the collapsed set
    /// changes; regions are never recomputed from here.
    pub fn toggle_fold(&mut self, line: usize) -> bool {
        if self.region_at(line).is_none() {
            return false;
        }
        if !self.folded.remove(&line) {
            self.folded.insert(line);
        }
        self.revision += 1;
        true
    }

    /// Collapse every region. Returns `true` if anything changed.
    pub fn fold_all(&mut self) -> bool {
        let before = self.folded.len();
        self.folded
            .extend(self.regions.iter().map(|region| region.start_line));
        self.bump_if(self.folded.len() != before)
    }

    /// Expand every region. Returns `true` if anything changed.
    pub fn unfold_all(&mut self) -> bool {
        let changed = !self.folded.is_empty();
        self.folded.clear();
        self.bump_if(changed)
    }

    /// Expand every collapsed region that hides `line`. Returns `true` if anything changed.
    pub fn unfold_containing(&mut self, line: usize) -> bool {
        let hiding: Vec<usize> = self
            .regions
            .iter()
            .filter(|region| self.folded.contains(&region.start_line) && region.hides_line(line))
            .map(|region| region.start_line)
            .collect();
        for anchor in &hiding {
            self.folded.remove(anchor);
        }
        self.bump_if(!hiding.is_empty())
    }

    /// Request a full recompute on the next [`sync`](Self::sync).
    pub fn request_recompute(&mut self) {
        self.force_recompute = true;
    }

    /// Replace the collapsed set, e.g. with one captured in an undo entry.
    ///
    /// Anchors that do not start a region are dropped on the next recompute.
    pub fn restore_folded(&mut self, folded: BTreeSet<usize>) -> bool {
        let changed = folded != self.folded;
        self.folded = folded;
        self.bump_if(changed)
    }

    /// Mark the start of an edit. Drift-based recompute is suppressed until
    /// [`end_edit`](Self::end_edit).
    pub fn begin_edit(&mut self) {
        self.mid_edit = true;
    }

    /// Shift regions and collapsed anchors across an edit.
    ///
    /// `remap_anchor` maps a pre-edit anchor line to its post-edit line, or `None` when the
    /// anchor line was removed.
    pub fn apply_edit(
        &mut self,
        edit: LineEdit,
        mut remap_anchor: impl FnMut(usize) -> Option<usize>,
    ) {
        let adjustment = adjust_regions_for_edit(
            &self.regions,
            edit.start_line,
            edit.end_line,
            edit.line_delta,
        );
        let regions_moved = adjustment.regions != self.regions;
        self.regions = adjustment.regions;
        if adjustment.overlapped {
            self.force_recompute = true;
        }

        let folded: BTreeSet<usize> = self
            .folded
            .iter()
            .copied()
            .filter_map(&mut remap_anchor)
            .collect();
        let folded_moved = folded != self.folded;
        self.folded = folded;
        self.bump_if(regions_moved || folded_moved);
    }

    /// Mark the end of an edit and bring regions in line with `document`.
    pub fn end_edit(&mut self, document: &Document) -> bool {
        self.mid_edit = false;
        self.sync(document)
    }

    /// Apply the recompute policy. Returns `true` if regions were fully recomputed.
    pub fn sync(&mut self, document: &Document) -> bool {
        let line_count = document.line_count();
        let drifted =
            !self.mid_edit && line_count.abs_diff(self.computed_line_count) >= self.recompute_drift;

        if self.force_recompute || drifted {
            self.recompute(document);
            true
        } else {
            self.clamp_to_line_count(line_count);
            false
        }
    }

    fn recompute(&mut self, document: &Document) {
        let regions = detect_foldable_regions(&document.text(), &self.indent);
        let changed = regions != self.regions;
        self.regions = regions;
        self.computed_line_count = document.line_count();
        self.force_recompute = false;
        self.bump_if(changed);
        self.retain_anchored_folds();
        tracing::debug!(
            regions = self.regions.len(),
            folded = self.folded.len(),
            lines = self.computed_line_count,
            "recomputed fold regions"
        );
    }

    fn clamp_to_line_count(&mut self, line_count: usize) {
        let before = self.regions.len();
        self.regions.retain(|region| {
            region.start_line >= 1
                && region.start_line < region.end_line
                && region.end_line <= line_count
        });
        self.regions.sort_by_key(|region| region.start_line);
        self.regions.dedup_by_key(|region| region.start_line);
        self.bump_if(self.regions.len() != before);
        self.retain_anchored_folds();
    }

    fn retain_anchored_folds(&mut self) {
        let before = self.folded.len();
        let regions = &self.regions;
        self.folded.retain(|line| {
            regions
                .binary_search_by_key(line, |region| region.start_line)
                .is_ok()
        });
        self.bump_if(self.folded.len() != before);
    }

    fn bump_if(&mut self, changed: bool) -> bool {
        if changed {
            self.revision += 1;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Vec<FoldRegion> {
        detect_foldable_regions(text, &IndentConfig::default())
    }

    #[test]
    fn test_detect_single_block() {
        assert_eq!(
            detect("if x:\n    y()\n    z()\nw()"),
            vec![FoldRegion::new(1, 3)]
        );
    }

    #[test]
    fn test_detect_nested_blocks_and_blank_lines() {
        let text = "def f():\n    if a:\n        b()\n\n        c()\n    d()\ne()";
        assert_eq!(
            detect(text),
            vec![FoldRegion::new(1, 6), FoldRegion::new(2, 5)]
        );
    }

    #[test]
    fn test_detect_tabs_count_as_four_columns() {
        assert_eq!(detect("a\n\tb\n    c\nd"), vec![FoldRegion::new(1, 3)]);
        // A tab and four spaces have equal width, so neither opens a block over the other.
        assert!(detect("\ta\n    b").is_empty());
    }

    #[test]
    fn test_detect_trailing_blank_lines_are_not_included() {
        assert_eq!(detect("a\n  b\n\n\n"), vec![FoldRegion::new(1, 2)]);
        assert!(detect("").is_empty());
        assert!(detect("a\nb\nc").is_empty());
    }

    #[test]
    fn test_adjust_regions_for_edit() {
        let regions = vec![
            FoldRegion::new(1, 3),
            FoldRegion::new(5, 8),
            FoldRegion::new(10, 12),
        ];

        let adjusted = adjust_regions_for_edit(&regions, 4, 4, 2);
        assert!(!adjusted.overlapped);
        assert_eq!(
            adjusted.regions,
            vec![
                FoldRegion::new(1, 3),
                FoldRegion::new(7, 10),
                FoldRegion::new(12, 14),
            ]
        );

        let adjusted = adjust_regions_for_edit(&regions, 6, 6, -1);
        assert!(adjusted.overlapped);
        assert_eq!(adjusted.regions[1], FoldRegion::new(5, 8));
        assert_eq!(adjusted.regions[2], FoldRegion::new(9, 11));
    }

    #[test]
    fn test_toggle_requires_anchor() {
        let doc = Document::new("if x:\n    y()\nw()");
        let mut engine = FoldEngine::new(&doc, IndentConfig::default(), DEFAULT_RECOMPUTE_DRIFT);

        assert!(!engine.toggle_fold(2));
        assert!(!engine.toggle_fold(99));
        let revision = engine.revision();
        assert!(engine.toggle_fold(1));
        assert!(engine.is_folded(1));
        assert!(engine.toggle_fold(1));
        assert!(!engine.is_folded(1));
        assert_eq!(engine.revision(), revision + 2);
    }

    #[test]
    fn test_apply_edit_shifts_folded_anchor() {
        let doc = Document::new("if x:\n    y()\n    z()\nw()");
        let mut engine = FoldEngine::new(&doc, IndentConfig::default(), DEFAULT_RECOMPUTE_DRIFT);
        engine.toggle_fold(1);

        // A blank line inserted at offset 0 touches line 1, so the region needs a recompute.
        let edited = Document::new("\nif x:\n    y()\n    z()\nw()");
        engine.begin_edit();
        engine.apply_edit(
            LineEdit {
                start_line: 1,
                end_line: 1,
                line_delta: 1,
            },
            |line| Some(line + 1),
        );
        assert!(engine.recompute_pending());
        assert!(engine.end_edit(&edited));
        assert_eq!(engine.regions(), &[FoldRegion::new(2, 4)]);
        assert!(engine.is_folded(2));
    }

    #[test]
    fn test_fold_all_and_unfold_containing() {
        let doc = Document::new("a\n  b\n    c\n  d\ne");
        let mut engine = FoldEngine::new(&doc, IndentConfig::default(), DEFAULT_RECOMPUTE_DRIFT);
        assert_eq!(engine.regions(), &[FoldRegion::new(1, 4), FoldRegion::new(2, 3)]);

        assert!(engine.fold_all());
        assert!(!engine.fold_all());
        assert!(engine.unfold_containing(3));
        assert!(engine.folded().is_empty());

        assert!(engine.toggle_fold(2));
        assert!(!engine.unfold_containing(5));
        assert!(engine.unfold_all());
        assert!(!engine.unfold_all());
    }

    #[test]
    fn test_drift_triggers_recompute_only_outside_edits() {
        let doc = Document::new("a");
        let mut engine = FoldEngine::new(&doc, IndentConfig::default(), 3);

        let grown = Document::new("a\n  b\n  c\n  d");
        engine.begin_edit();
        assert!(!engine.sync(&grown));
        assert!(engine.regions().is_empty());
        assert!(engine.end_edit(&grown));
        assert_eq!(engine.regions(), &[FoldRegion::new(1, 4)]);
    }

    #[test]
    fn test_recompute_drops_orphaned_anchors() {
        let doc = Document::new("a\n  b\nc\n  d");
        let mut engine = FoldEngine::new(&doc, IndentConfig::default(), DEFAULT_RECOMPUTE_DRIFT);
        engine.toggle_fold(1);
        engine.toggle_fold(3);

        let flattened = Document::new("a\n  b\nc\nd");
        engine.request_recompute();
        assert!(engine.sync(&flattened));
        assert_eq!(engine.folded().iter().copied().collect::<Vec<_>>(), vec![1]);
    }
}
