//! Turns application state into one exactly sized frame.

use std::path::Path;

use tracing::debug;

use crate::app::{AppState, FocusPanel};
use crate::error::{Error, Result};
use crate::graph::HistoryMode;
use crate::ui::compositor::{Block, join_horizontal};
use crate::ui::widgets::{HeaderBar, Panel, ShortcutBar, ShortcutContext};
use crate::ui::{Frame, ScreenLayout, Theme, ansi};
use crate::views::{CommitDetailView, CommitGraphView};

/// Cap on the graph panel width as a percentage of the terminal
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub graph_max_percent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            graph_max_percent: 60,
        }
    }
}

fn log_hint(log_path: Option<&Path>) -> String {
    match log_path {
        Some(path) => format!("Check {} for details.", path.display()),
        None => "Run with GITRAFFE_LOG=debug for details.".to_string(),
    }
}

/// Render the whole screen
pub fn render_frame(state: &AppState, theme: &Theme, options: RenderOptions) -> Result<Frame> {
    let (width, height) = (state.width, state.height);
    if width == 0 || height == 0 {
        return Ok(Frame::message(width, height, "Initializing..."));
    }

    let max_graph_width = state.history.as_ref().map_or(0, |h| h.max_graph_width);
    let Some(layout) =
        ScreenLayout::compute(width, height, max_graph_width, options.graph_max_percent)
    else {
        debug!("terminal too small ({width}x{height})");
        return Ok(Frame::placeholder(width, height));
    };

    if let Some(message) = &state.load_error {
        return Ok(error_frame(state, theme, message));
    }

    let focused = state.selection.focused;
    let header = HeaderBar::new(&state.repo.name, &state.repo.branch, &state.repo.head).layout(
        theme,
        layout.header.width,
        layout.header.height,
        focused == FocusPanel::RepoInfo,
    );

    // Simple mode means git's graph output was unavailable
    let graph_label = match state.history.as_ref().map(|h| h.mode) {
        Some(HistoryMode::Simple) => "[1] simple",
        _ => "[1]",
    };
    let graph_panel = Panel::new()
        .with_border(theme.border(focused == FocusPanel::CommitList))
        .with_label(graph_label)
        .with_padding(0, 1);
    let (graph_w, graph_h) = graph_panel.content_size(layout.graph.width, layout.graph.height);

    let detail_panel = Panel::new()
        .with_border(theme.border(focused == FocusPanel::CommitDetail))
        .with_label("[2]")
        .with_padding(1, 2);
    let (_, detail_h) = detail_panel.content_size(layout.detail.width, layout.detail.height);

    let (graph_lines, detail_lines) = match &state.history {
        None => (vec![theme.paint("Loading history...", theme.help)], Vec::new()),
        Some(history) => {
            let graph = CommitGraphView::new(
                history,
                state.selection.selected_commit,
                state.graph_scroll_x,
            )
            .layout(theme, graph_w, graph_h)?;
            let detail = match history.store.get(state.selection.selected_commit) {
                Ok(commit) => CommitDetailView::layout(
                    commit,
                    theme,
                    state.selection.detail_scroll,
                    detail_h,
                ),
                Err(_) if history.store.is_empty() => Vec::new(),
                Err(e) => return Err(e),
            };
            (graph, detail)
        }
    };

    let panels = join_horizontal(&[
        Block::new(
            layout.graph.width,
            graph_panel.render(&graph_lines, layout.graph.width, layout.graph.height),
        ),
        Block::new(
            layout.detail.width,
            detail_panel.render(&detail_lines, layout.detail.width, layout.detail.height),
        ),
    ]);
    if panels.len() != layout.graph.height {
        return Err(Error::RenderFault(format!(
            "panels are {} lines, expected {}",
            panels.len(),
            layout.graph.height
        )));
    }

    let context = match focused {
        FocusPanel::RepoInfo => ShortcutContext::RepoInfo,
        FocusPanel::CommitList => ShortcutContext::Graph,
        FocusPanel::CommitDetail => ShortcutContext::Detail,
    };
    let footer = ShortcutBar::new(context)
        .with_status(state.status.as_deref())
        .layout(theme, layout.footer.width);

    let frame = Frame::compose(width, height, &header, &panels, &[footer]);
    // A stray newline inside any line would scroll the terminal
    let drawn = frame.line_height();
    if drawn != height {
        return Err(Error::RenderFault(format!(
            "frame spans {drawn} terminal lines, expected {height}"
        )));
    }
    Ok(frame)
}

/// Frame shown when no history could be loaded at all
fn error_frame(state: &AppState, theme: &Theme, message: &str) -> Frame {
    let mut lines = vec![
        String::new(),
        format!("  {}", theme.bold("❌ Error loading repository", theme.error)),
        String::new(),
    ];
    for (i, line) in ansi::sanitize_lines(message).into_iter().enumerate() {
        let prefix = if i == 0 { "  Error: " } else { "         " };
        lines.push(format!("{prefix}{line}"));
    }
    lines.push(String::new());
    lines.push(format!(
        "  Press q to quit. {}",
        log_hint(state.log_path.as_deref())
    ));
    Frame::compose(state.width, state.height, &[], &lines, &[])
}

/// Frame substituted when rendering itself failed
pub fn diagnostic_frame(err: &Error, width: usize, height: usize, log_path: Option<&Path>) -> Frame {
    let lines = vec![
        String::new(),
        format!("  {}", ansi::sanitize(&err.to_string())),
        String::new(),
        format!("  Press q to quit. {}", log_hint(log_path)),
    ];
    Frame::compose(width, height, &[], &lines, &[])
}
