//! Header bar widget - repository name, branch and head commit

use crate::ui::Theme;
use crate::ui::ansi;
use crate::ui::widgets::Panel;

pub const TITLE: &str = "🦒 Gitraffe - Git Graph Viewer";

/// Header bar widget displaying repo info
#[derive(Clone, Debug, Default)]
pub struct HeaderBar {
    /// Repository name
    pub repo_name: String,
    /// Current branch name
    pub branch_name: String,
    /// Short id of the checked out commit
    pub head: String,
}

impl HeaderBar {
    pub fn new(repo_name: &str, branch_name: &str, head: &str) -> Self {
        Self {
            repo_name: ansi::sanitize(repo_name),
            branch_name: ansi::sanitize(branch_name),
            head: ansi::sanitize(head),
        }
    }

    /// Single content line: repo info on the left, title pushed to the right
    pub fn content(&self, theme: &Theme, width: usize) -> String {
        let left = format!(
            "{}{}  {}{}  {}{}",
            theme.bold("Repository: ", theme.accent),
            self.repo_name,
            theme.bold("Branch: ", theme.branch),
            theme.paint(&self.branch_name, theme.branch),
            theme.bold("Commit: ", theme.hash),
            theme.paint(&self.head, theme.hash),
        );
        let title = theme.bold(TITLE, theme.accent);

        let used = ansi::visible_width(&left) + ansi::visible_width(&title);
        let spacing = width.saturating_sub(used).max(1);
        format!("{left}{}{title}", " ".repeat(spacing))
    }

    /// Render the bordered header box, labeled `[0]`
    pub fn layout(&self, theme: &Theme, width: usize, height: usize, focused: bool) -> Vec<String> {
        let panel = Panel::new()
            .with_border(theme.border(focused))
            .with_label("[0]")
            .with_padding(0, 1);
        let (content_width, _) = panel.content_size(width, height);
        panel.render(&[self.content(theme, content_width)], width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_content() {
        let header = HeaderBar::new("gitraffe", "main", "abc1234");
        let line = ansi::strip(&header.content(&Theme::dark(), 100));
        assert!(line.starts_with("Repository: gitraffe  Branch: main  Commit: abc1234"));
        assert!(line.ends_with(TITLE));
        assert_eq!(ansi::visible_width(&line), 100);
    }

    #[test]
    fn test_header_box_is_exact() {
        let header = HeaderBar::new("repo", "feature/x", "0000000");
        let lines = header.layout(&Theme::dark(), 40, 3, true);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| ansi::visible_width(l) == 40));
        assert!(ansi::strip(&lines[0]).starts_with("╭[0]"));
    }

    #[test]
    fn test_header_strips_control_characters() {
        let header = HeaderBar::new("re\x1b[2Jpo", "main", "abc");
        assert_eq!(header.repo_name, "re[2Jpo");
    }
}
