//! Commit graph panel - connector column and short hashes, one line per display row

use crossterm::style::{Color, Stylize};
use tracing::debug;

use crate::error::Result;
use crate::graph::History;
use crate::ui::Theme;
use crate::ui::ansi;
use crate::ui::scroll::visible_range;

/// Selection marker plus the space before the hash
const MARKER_WIDTH: usize = 2;
/// Space plus a short hash
const HASH_COLUMN: usize = 8;

/// Read-only view over a loaded history
pub struct CommitGraphView<'a> {
    history: &'a History,
    selected_commit: usize,
    /// Connector columns hidden on the left
    scroll_x: usize,
}

impl<'a> CommitGraphView<'a> {
    pub fn new(history: &'a History, selected_commit: usize, scroll_x: usize) -> Self {
        Self {
            history,
            selected_commit,
            scroll_x,
        }
    }

    /// Widest horizontal pan that still leaves part of the connector visible
    pub fn max_scroll_x(history: &History) -> usize {
        history.max_graph_width.saturating_sub(1)
    }

    /// Render the visible rows into at most `height` lines of `width` columns
    pub fn layout(&self, theme: &Theme, width: usize, height: usize) -> Result<Vec<String>> {
        if self.history.store.is_empty() {
            return Ok(vec!["No commits found".to_string()]);
        }

        let selected_row = self.history.row_of_commit(self.selected_commit)?;
        let range = visible_range(self.history.rows.len(), selected_row, height);

        let scroll_x = self.scroll_x.min(Self::max_scroll_x(self.history));
        let graph_width = self
            .history
            .max_graph_width
            .saturating_sub(scroll_x)
            .min(width.saturating_sub(MARKER_WIDTH + HASH_COLUMN).max(1));
        debug!(
            "graph rows {range:?} of {} (selected row {selected_row}, graph width {graph_width})",
            self.history.rows.len()
        );

        let mut lines = Vec::with_capacity(range.len());
        for row in &self.history.rows[range] {
            let commit = row.commit.map(|index| self.history.store.get(index)).transpose()?;
            let is_selected = row.commit == Some(self.selected_commit);

            let glyphs: String = row.connector_glyphs.chars().skip(scroll_x).collect();
            let glyphs = ansi::fit_width(&glyphs, graph_width);

            let line = match commit {
                Some(commit) if is_selected => format!(
                    "> {} {}",
                    glyphs.replace('●', "◉").with(Color::White).bold(),
                    theme.highlight(&commit.short_hash, theme.hash),
                ),
                Some(commit) => format!(
                    "  {} {}",
                    theme.paint(&glyphs, theme.hash),
                    theme.paint(&commit.short_hash, theme.hash),
                ),
                None => format!("  {}", theme.paint(&glyphs, theme.hash)),
            };
            lines.push(line);
        }
        Ok(lines)
    }
}
