//! Keyboard shortcut status bar - shows context-sensitive shortcuts for the focused panel

use crate::ui::Theme;
use crate::ui::ansi;

/// Which panel shortcuts to display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutContext {
    RepoInfo,
    Graph,
    Detail,
}

/// A single shortcut hint: key label + action description
struct ShortcutHint {
    key: &'static str,
    action: &'static str,
}

/// Single line at the bottom showing keyboard shortcuts, or a status message
pub struct ShortcutBar {
    context: ShortcutContext,
    /// Transient message shown instead of the hints
    pub status: Option<String>,
}

impl ShortcutBar {
    pub fn new(context: ShortcutContext) -> Self {
        Self {
            context,
            status: None,
        }
    }

    pub fn with_status(mut self, status: Option<&str>) -> Self {
        self.status = status.map(ansi::sanitize);
        self
    }

    /// Render the bar as one line of exactly `width` columns
    pub fn layout(&self, theme: &Theme, width: usize) -> String {
        if let Some(status) = &self.status {
            return ansi::fit_width(&theme.paint(status, theme.hash), width);
        }

        let divider = theme.paint(" • ", theme.help);
        let line = self
            .hints_for_context()
            .iter()
            .map(|hint| {
                format!(
                    "{} {}",
                    theme.bold(hint.key, theme.message),
                    theme.paint(hint.action, theme.help)
                )
            })
            .collect::<Vec<_>>()
            .join(&divider);
        ansi::fit_width(&line, width)
    }

    fn hints_for_context(&self) -> Vec<ShortcutHint> {
        let mut hints = vec![ShortcutHint { key: "0/1/2", action: "focus box" }];
        match self.context {
            ShortcutContext::Graph => hints.extend([
                ShortcutHint { key: "↑/↓/j/k", action: "select" },
                ShortcutHint { key: "d/u", action: "page" },
                ShortcutHint { key: "g/G", action: "top/bottom" },
                ShortcutHint { key: "h/l", action: "pan graph" },
            ]),
            ShortcutContext::Detail => hints.extend([
                ShortcutHint { key: "↑/↓/j/k", action: "scroll" },
                ShortcutHint { key: "d/u", action: "page" },
                ShortcutHint { key: "g/G", action: "top/bottom" },
            ]),
            ShortcutContext::RepoInfo => hints.push(ShortcutHint { key: "Tab", action: "next box" }),
        }
        hints.push(ShortcutHint { key: "r", action: "reload" });
        hints.push(ShortcutHint { key: "q/esc", action: "quit" });
        hints
    }
}
