//! Breakpoint line set.
//!
//! Breakpoints are opaque to the core: a set of 1-based logical lines the host toggles and
//! queries. The only thing the core does with them is keep them attached to their lines across
//! edits.

use std::collections::BTreeSet;

/// Ordered set of breakpoint lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakpoints {
    lines: BTreeSet<usize>,
}

impl Breakpoints {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the breakpoint on `line`. Out-of-range lines are ignored (returns `false`).
    pub fn toggle(&mut self, line: usize, line_count: usize) -> bool {
        if line == 0 || line > line_count {
            return false;
        }
        if !self.lines.remove(&line) {
            self.lines.insert(line);
        }
        true
    }

    /// Replace the whole set, dropping out-of-range lines. Returns `true` if the set changed.
    pub fn set(&mut self, lines: impl IntoIterator<Item = usize>, line_count: usize) -> bool {
        let lines: BTreeSet<usize> = lines
            .into_iter()
            .filter(|line| (1..=line_count).contains(line))
            .collect();
        let changed = lines != self.lines;
        self.lines = lines;
        changed
    }

    /// Remove every breakpoint. Returns `true` if any was set.
    pub fn clear(&mut self) -> bool {
        let changed = !self.lines.is_empty();
        self.lines.clear();
        changed
    }

    /// Returns `true` if `line` has a breakpoint.
    pub fn contains(&self, line: usize) -> bool {
        self.lines.contains(&line)
    }

    /// Number of breakpoints.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if no breakpoint is set.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Breakpoint lines in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().copied()
    }

    /// Move every breakpoint through an edit; `remap` returns `None` for lines that were removed.
    pub fn remap(&mut self, remap: impl FnMut(usize) -> Option<usize>) {
        self.lines = std::mem::take(&mut self.lines)
            .into_iter()
            .filter_map(remap)
            .collect();
    }

    /// Drop breakpoints past `line_count`.
    pub fn clamp(&mut self, line_count: usize) {
        self.lines.retain(|line| *line <= line_count);
    }
}
