//! Document store
//!
//! Holds the canonical text of the editing session in a rope, providing O(log N) line access and
//! editing. Offsets are character offsets (Unicode scalar values); line numbers are 1-based.
//!
//! Only `'\n'` is a line break: a `'\r'` preceding it is ordinary line content, so the logical
//! lines of a document are exactly `text.split('\n')`.

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;

/// An immutable, cheaply clonable copy of a document's text at one version.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    rope: Rope,
}

impl DocumentSnapshot {
    /// Full text of the snapshot.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Character count of the snapshot.
    pub fn char_len(&self) -> usize {
        self.rope.len_chars()
    }
}

/// Canonical text buffer.
///
/// Mutation happens only through the command executor; everything else reads.
#[derive(Debug, Clone)]
pub struct Document {
    rope: Rope,
    version: u64,
}

impl Document {
    /// Build a document from text.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            version: 0,
        }
    }

    /// Version number, incremented on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total character count.
    pub fn char_len(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of logical lines (N newlines => N+1 lines).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns `true` if `line` is a valid 1-based line number.
    pub fn contains_line(&self, line: usize) -> bool {
        line >= 1 && line <= self.line_count()
    }

    /// Character offset of the first character of `line`.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.contains_line(line)
            .then(|| self.rope.line_to_char(line - 1))
    }

    /// Length of `line` in characters, excluding its `'\n'` (0 for out-of-range lines).
    pub fn line_len(&self, line: usize) -> usize {
        if !self.contains_line(line) {
            return 0;
        }
        let len = self.rope.line(line - 1).len_chars();
        if line < self.line_count() {
            len.saturating_sub(1)
        } else {
            len
        }
    }

    /// Text of `line`, excluding its `'\n'`.
    pub fn line_text(&self, line: usize) -> Option<String> {
        let start = self.line_start(line)?;
        let end = start + self.line_len(line);
        Some(self.rope.slice(start..end).to_string())
    }

    /// Iterate over all logical lines in order, without their `'\n'`.
    pub fn lines(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        self.rope.lines().map(|slice| match Cow::from(slice) {
            Cow::Borrowed(line) => Cow::Borrowed(line.strip_suffix('\n').unwrap_or(line)),
            Cow::Owned(mut line) => {
                if line.ends_with('\n') {
                    line.pop();
                }
                Cow::Owned(line)
            }
        })
    }

    /// 1-based line containing `offset` (clamped to the document).
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.char_len())) + 1
    }

    /// Convert an offset to a 1-based line and a 0-based column (offset is clamped).
    pub fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.char_len());
        let line_idx = self.rope.char_to_line(offset);
        (line_idx + 1, offset - self.rope.line_to_char(line_idx))
    }

    /// Convert a 1-based line and a column to an offset, clamping both to the document.
    pub fn position_to_offset(&self, line: usize, column: usize) -> usize {
        let line = line.clamp(1, self.line_count());
        let start = self.rope.line_to_char(line - 1);
        start + column.min(self.line_len(line))
    }

    /// Clamp a range to the document, ordering its bounds.
    pub fn clamp_range(&self, range: Range<usize>) -> Range<usize> {
        let len = self.char_len();
        let start = range.start.min(range.end).min(len);
        let end = range.start.max(range.end).min(len);
        start..end
    }

    /// Text in `range` (clamped).
    pub fn slice(&self, range: Range<usize>) -> String {
        let range = self.clamp_range(range);
        self.rope.slice(range).to_string()
    }

    /// Number of `'\n'` characters inside `range` (clamped).
    pub fn count_newlines(&self, range: Range<usize>) -> usize {
        let range = self.clamp_range(range);
        self.rope.char_to_line(range.end) - self.rope.char_to_line(range.start)
    }

    /// Replace `range` (clamped) with `text`.
    pub fn replace(&mut self, range: Range<usize>, text: &str) {
        let range = self.clamp_range(range);
        if !range.is_empty() {
            self.rope.remove(range.clone());
        }
        if !text.is_empty() {
            self.rope.insert(range.start, text);
        }
        self.version += 1;
    }

    /// Take a snapshot of the current text.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            rope: self.rope.clone(),
        }
    }

    /// Replace the whole text with a snapshot.
    pub fn restore(&mut self, snapshot: DocumentSnapshot) {
        self.rope = snapshot.rope;
        self.version += 1;
    }

    /// Replace the whole text.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_follow_newline_split() {
        let doc = Document::new("ABC\nDEF\n");
        assert_eq!(doc.line_count(), 3);
        let lines: Vec<_> = doc.lines().collect();
        assert_eq!(lines, vec!["ABC", "DEF", ""]);
    }

    #[test]
    fn test_carriage_return_is_line_content() {
        let doc = Document::new("a\r\nb");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_text(1).as_deref(), Some("a\r"));
        assert_eq!(doc.line_len(1), 2);
    }

    #[test]
    fn test_offset_position_conversion() {
        let doc = Document::new("ABC\nDEF\nGHI");
        assert_eq!(doc.offset_to_position(0), (1, 0));
        assert_eq!(doc.offset_to_position(3), (1, 3));
        assert_eq!(doc.offset_to_position(4), (2, 0));
        assert_eq!(doc.offset_to_position(999), (3, 3));
        assert_eq!(doc.position_to_offset(2, 1), 5);
        assert_eq!(doc.position_to_offset(2, 99), 7);
        assert_eq!(doc.position_to_offset(0, 0), 0);
        assert_eq!(doc.line_of_offset(8), 3);
    }

    #[test]
    fn test_utf8_cjk() {
        let doc = Document::new("你好\n世界");
        assert_eq!(doc.char_len(), 5);
        assert_eq!(doc.line_start(2), Some(3));
        assert_eq!(doc.line_text(2).as_deref(), Some("世界"));
    }

    #[test]
    fn test_replace_bumps_version_and_counts_newlines() {
        let mut doc = Document::new("Hello World");
        doc.replace(6..11, "Big\nWorld");
        assert_eq!(doc.text(), "Hello Big\nWorld");
        assert_eq!(doc.version(), 1);
        assert_eq!(doc.count_newlines(0..doc.char_len()), 1);
        assert_eq!(doc.count_newlines(0..5), 0);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut doc = Document::new("one");
        let snapshot = doc.snapshot();
        doc.replace(0..3, "two");
        doc.restore(snapshot);
        assert_eq!(doc.text(), "one");
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_out_of_range_lines() {
        let doc = Document::new("x");
        assert_eq!(doc.line_start(0), None);
        assert_eq!(doc.line_start(2), None);
        assert_eq!(doc.line_text(5), None);
        assert_eq!(doc.line_len(5), 0);
    }
}
