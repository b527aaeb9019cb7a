use unicode_segmentation::UnicodeSegmentation;

pub(crate) fn split_lines(text: &str) -> std::str::Split<'_, char> {
    // `str::split('\n')` preserves trailing empty segments (N newlines => N+1 lines), which keeps
    // line numbering consistent with the rope.
    text.split('\n')
}

pub(crate) fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Length in chars of the last grapheme cluster of `text` (0 for empty text).
pub(crate) fn last_grapheme_len(text: &str) -> usize {
    text.graphemes(true)
        .next_back()
        .map(char_len)
        .unwrap_or(0)
}

/// Length in chars of the first grapheme cluster of `text` (0 for empty text).
pub(crate) fn first_grapheme_len(text: &str) -> usize {
    text.graphemes(true).next().map(char_len).unwrap_or(0)
}
