//! Scroll windows over row lists and flat line buffers.

use std::ops::Range;

/// Visible `[start, end)` range of rows keeping `selected` in view.
///
/// The selection sits about one third down from the top while there is room
/// to scroll; near the end of the list the window slides back so it stays
/// full. A zero height is treated as one row, and a selection past the end
/// is clamped to the last row.
pub fn visible_range(total: usize, selected: usize, height: usize) -> Range<usize> {
    if total == 0 {
        return 0..0;
    }
    let height = height.max(1);
    let selected = selected.min(total - 1);

    let mut start = selected.saturating_sub(height / 3);
    let end = (start + height).min(total);
    if end - start < height {
        start = end.saturating_sub(height);
    }
    start..end
}

/// Offset into a flat buffer of rendered lines
pub struct DetailScroll;

impl DetailScroll {
    /// Clamp `offset` to `[0, line_count - 1]`
    pub fn clamp(offset: usize, line_count: usize) -> usize {
        offset.min(line_count.saturating_sub(1))
    }

    /// `height` lines starting at `offset`, padded with empty lines
    pub fn slice<T: Clone + Default>(lines: &[T], offset: usize, height: usize) -> Vec<T> {
        let start = Self::clamp(offset, lines.len()).min(lines.len());
        let end = (start + height).min(lines.len());
        let mut out = lines[start..end].to_vec();
        out.resize(height, T::default());
        out
    }
}
