//! Screen layout builder - creates the main application layout

use tracing::debug;

use super::Rect;

/// Smallest terminal that gets the full layout; anything smaller shows a placeholder
pub const MIN_WIDTH: usize = 20;
pub const MIN_HEIGHT: usize = 10;

/// Header box: one content line plus its border
const HEADER_HEIGHT: usize = 3;
/// Key help line
const FOOTER_HEIGHT: usize = 1;

/// Graph panel overhead: selection marker (2), space (1), short hash (7),
/// border (2) and padding (2)
const GRAPH_CHROME: usize = 14;
const MIN_GRAPH_WIDTH: usize = 15;
const PREFERRED_GRAPH_WIDTH: usize = 25;
const MIN_DETAIL_WIDTH: usize = 30;

/// The computed layout regions for the main screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenLayout {
    /// Repository info box across the top
    pub header: Rect,
    /// Commit graph panel (left)
    pub graph: Rect,
    /// Commit detail panel (right)
    pub detail: Rect,
    /// Key help line
    pub footer: Rect,
}

impl ScreenLayout {
    /// Create the screen layout for a terminal of the given size
    ///
    /// Layout structure:
    /// ```text
    /// +----------------------------------------------------------+
    /// |                    HEADER [0] (3 lines)                  |
    /// +-------------------------+--------------------------------+
    /// |                         |                                |
    /// |   GRAPH [1]             |   DETAIL [2]                   |
    /// |   max_graph_width + 14  |   remaining width, min 30      |
    /// |                         |                                |
    /// +-------------------------+--------------------------------+
    /// | help                                                     |
    /// ```
    ///
    /// Returns `None` below [`MIN_WIDTH`] x [`MIN_HEIGHT`].
    pub fn compute(
        width: usize,
        height: usize,
        max_graph_width: usize,
        graph_max_percent: usize,
    ) -> Option<Self> {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return None;
        }

        let bounds = Rect::from_size(width, height);
        let (header, main) = bounds.take_top(HEADER_HEIGHT);
        let (panels, footer) = main.take_bottom(FOOTER_HEIGHT);

        let graph_width = Self::graph_width(width, max_graph_width, graph_max_percent);
        let (graph, detail) = panels.take_left(graph_width);

        debug!(
            "layout {width}x{height}: graph={} detail={} panels={}",
            graph.width, detail.width, panels.height
        );
        Some(Self {
            header,
            graph,
            detail,
            footer,
        })
    }

    /// Width of the graph panel; the detail panel takes the rest
    fn graph_width(width: usize, max_graph_width: usize, max_percent: usize) -> usize {
        let cap = width * max_percent.clamp(1, 100) / 100;
        let graph = (max_graph_width + GRAPH_CHROME)
            .max(PREFERRED_GRAPH_WIDTH)
            .min(cap)
            .max(MIN_GRAPH_WIDTH);

        if width.saturating_sub(graph) >= MIN_DETAIL_WIDTH {
            graph
        } else {
            width.saturating_sub(MIN_DETAIL_WIDTH).max(MIN_GRAPH_WIDTH)
        }
    }
}
