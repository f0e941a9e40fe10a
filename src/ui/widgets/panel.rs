//! Panel widget - a container with a rounded border and label

use crossterm::style::{Color, Stylize};

use crate::ui::ansi::RESET;
use crate::ui::compositor::{add_box_label, blank, fit_frame_height, fit_lines};

/// A bordered container producing exactly sized text blocks
#[derive(Clone, Debug)]
pub struct Panel {
    pub border: Color,
    /// Short label drawn into the top border
    pub label: Option<String>,
    /// Blank lines above and below the content
    pub padding_v: usize,
    /// Blank columns left and right of the content
    pub padding_h: usize,
}

impl Panel {
    pub fn new() -> Self {
        Self {
            border: Color::Grey,
            label: None,
            padding_v: 0,
            padding_h: 1,
        }
    }

    /// Set the border color
    pub fn with_border(mut self, color: Color) -> Self {
        self.border = color;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set padding
    pub fn with_padding(mut self, vertical: usize, horizontal: usize) -> Self {
        self.padding_v = vertical;
        self.padding_h = horizontal;
        self
    }

    /// Padding actually applied inside a block of the given inner size.
    /// Padding never takes more than half of either dimension.
    fn effective_padding(&self, inner_w: usize, inner_h: usize) -> (usize, usize) {
        (self.padding_v.min(inner_h / 2), self.padding_h.min(inner_w / 2))
    }

    /// Columns and lines available to content in a block of this size
    pub fn content_size(&self, width: usize, height: usize) -> (usize, usize) {
        let inner_w = width.saturating_sub(2);
        let inner_h = height.saturating_sub(2);
        let (pv, ph) = self.effective_padding(inner_w, inner_h);
        (inner_w - ph * 2, inner_h - pv * 2)
    }

    /// Render `content` into exactly `height` lines of `width` columns
    pub fn render(&self, content: &[String], width: usize, height: usize) -> Vec<String> {
        if width < 2 || height < 2 {
            return fit_lines(content, width, height);
        }

        let paint = |s: &str| s.with(self.border).to_string();
        let rule = "─".repeat(width - 2);

        let mut top = paint(&format!("╭{rule}╮"));
        if let Some(label) = &self.label {
            top = add_box_label(&top, label);
        }

        let mut lines = Vec::with_capacity(height);
        lines.push(top);
        let side = paint("│");
        for line in self.render_inner(content, width - 2, height - 2) {
            lines.push(format!("{side}{line}{side}"));
        }
        lines.push(paint(&format!("╰{rule}╯")));

        fit_frame_height(&lines, width, height)
    }

    fn render_inner(&self, content: &[String], width: usize, height: usize) -> Vec<String> {
        let (pv, ph) = self.effective_padding(width, height);
        let content_w = width - ph * 2;
        let content_h = height - pv * 2;
        let pad = blank(ph);

        let mut lines = Vec::with_capacity(height);
        lines.extend(std::iter::repeat_n(blank(width), pv));
        for line in fit_lines(content, content_w, content_h) {
            lines.push(format!("{pad}{line}{RESET}{pad}"));
        }
        lines.extend(std::iter::repeat_n(blank(width), pv));
        lines
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}
