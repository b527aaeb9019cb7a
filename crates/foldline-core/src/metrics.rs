//! Render-surface measurement, scrolling and minimap geometry.
//!
//! The core never measures pixels itself. A [`MetricsProvider`] supplies character widths and
//! the line height; everything here is arithmetic over projected line counts.

use unicode_width::UnicodeWidthChar;

/// Extra cells added to the gutter on top of the line-number digits.
pub const GUTTER_PADDING_CELLS: usize = 2;

/// Measures glyphs on the render surface.
pub trait MetricsProvider {
    /// Advance width of `ch`.
    fn char_width(&self, ch: char) -> f32;
    /// Height of one line.
    fn line_height(&self) -> f32;

    /// Width of `text`.
    fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|ch| self.char_width(ch)).sum()
    }
}

/// Fixed-cell metrics: every cell is `cell_width` wide (UAX #11 widths, wide chars take two cells).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    /// Width of one cell.
    pub cell_width: f32,
    /// Height of one line.
    pub line_height: f32,
}

impl MonospaceMetrics {
    /// Create metrics with the given cell size.
    pub fn new(cell_width: f32, line_height: f32) -> Self {
        Self {
            cell_width,
            line_height,
        }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl MetricsProvider for MonospaceMetrics {
    fn char_width(&self, ch: char) -> f32 {
        UnicodeWidthChar::width(ch).unwrap_or(1) as f32 * self.cell_width
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

/// Width of a gutter that can show line numbers up to `line_count`.
pub fn gutter_width(line_count: usize, metrics: &dyn MetricsProvider) -> f32 {
    let digits = line_count.max(1).ilog10() as usize + 1;
    (digits + GUTTER_PADDING_CELLS) as f32 * metrics.char_width('0')
}

/// Vertical scroll position, in projected lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    /// First visible projected line (0-based).
    pub scroll_top: usize,
    /// Number of lines that fit in the viewport.
    pub viewport_height: usize,
}

impl ScrollState {
    /// Create a scroll state.
    pub fn new(scroll_top: usize, viewport_height: usize) -> Self {
        Self {
            scroll_top,
            viewport_height,
        }
    }

    /// Largest valid `scroll_top` for a document of `line_count` projected lines.
    pub fn max_scroll(&self, line_count: usize) -> usize {
        line_count.saturating_sub(self.viewport_height.max(1))
    }

    /// Clamp `scroll_top` to the document.
    pub fn clamped(self, line_count: usize) -> Self {
        Self {
            scroll_top: self.scroll_top.min(self.max_scroll(line_count)),
            ..self
        }
    }

    /// Scroll position as a ratio in `[0, 1]`.
    pub fn ratio(&self, line_count: usize) -> f32 {
        let max = self.max_scroll(line_count);
        if max == 0 {
            0.0
        } else {
            self.scroll_top.min(max) as f32 / max as f32
        }
    }

    /// Scroll target for a ratio in `[0, 1]` (clamped).
    pub fn target_for_ratio(&self, ratio: f32, line_count: usize) -> usize {
        let ratio = if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        (ratio * self.max_scroll(line_count) as f32).round() as usize
    }

    /// Scroll the minimum amount that makes the 0-based projected line `line` visible.
    pub fn reveal(self, line: usize, line_count: usize) -> Self {
        let height = self.viewport_height.max(1);
        let scroll_top = if line < self.scroll_top {
            line
        } else if line >= self.scroll_top + height {
            line + 1 - height
        } else {
            self.scroll_top
        };
        Self {
            scroll_top,
            ..self
        }
        .clamped(line_count)
    }

    /// Minimap geometry for a document of `line_count` projected lines.
    pub fn minimap(&self, line_count: usize, metrics: &dyn MetricsProvider) -> MinimapGeometry {
        let lines = line_count.max(1);
        let visible = self.viewport_height.max(1).min(lines);
        let thumb_size_ratio = visible as f32 / lines as f32;
        let scroll_ratio = self.ratio(line_count);
        MinimapGeometry {
            content_height: line_count as f32 * metrics.line_height(),
            scroll_ratio,
            thumb_offset_ratio: scroll_ratio * (1.0 - thumb_size_ratio),
            thumb_size_ratio,
        }
    }
}

/// Minimap layout, as ratios of the minimap track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapGeometry {
    /// Projected content height (lines × line height).
    pub content_height: f32,
    /// Scroll position in `[0, 1]`.
    pub scroll_ratio: f32,
    /// Thumb top offset in `[0, 1]`.
    pub thumb_offset_ratio: f32,
    /// Thumb height in `(0, 1]`.
    pub thumb_size_ratio: f32,
}
