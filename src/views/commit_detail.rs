//! Commit detail panel - shows commit metadata, diff stats and the patch

use crate::graph::Commit;
use crate::ui::Theme;
use crate::ui::ansi;
use crate::ui::scroll::DetailScroll;

/// How a detail line is styled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineKind {
    #[default]
    Plain,
    Field(Field),
    Section,
    Message,
    Added,
    Removed,
    Hunk,
    FileHeader,
    Muted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Sha,
    Date,
    Author,
    Parents,
    Refs,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Sha => "SHA:     ",
            Field::Date => "Date:    ",
            Field::Author => "Author:  ",
            Field::Parents => "Parents: ",
            Field::Refs => "Refs:    ",
        }
    }
}

/// One unstyled line of the detail buffer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetailLine {
    pub kind: LineKind,
    pub text: String,
}

impl DetailLine {
    fn new(kind: LineKind, text: impl AsRef<str>) -> Self {
        Self {
            kind,
            text: ansi::sanitize(text.as_ref()),
        }
    }

    fn blank() -> Self {
        Self::default()
    }
}

fn section(title: &str) -> DetailLine {
    let rule = "─".repeat(34usize.saturating_sub(title.chars().count() + 5));
    DetailLine::new(LineKind::Section, format!("─── {title} {rule}"))
}

fn classify_patch_line(line: &str) -> LineKind {
    if line.starts_with('+') && !line.starts_with("+++") {
        LineKind::Added
    } else if line.starts_with('-') && !line.starts_with("---") {
        LineKind::Removed
    } else if line.starts_with("@@") {
        LineKind::Hunk
    } else if line.starts_with("diff ") {
        LineKind::FileHeader
    } else {
        LineKind::Plain
    }
}

pub const LOADING_DIFF: &str = "Loading diff...";

/// Flat detail buffer for one commit
pub struct CommitDetailView;

impl CommitDetailView {
    /// Build every line of the detail buffer, before scrolling
    pub fn build(commit: &Commit) -> Vec<DetailLine> {
        let mut lines = vec![
            DetailLine::new(LineKind::Field(Field::Sha), &commit.full_hash),
            DetailLine::new(LineKind::Field(Field::Date), commit.authored_at_display()),
            DetailLine::new(LineKind::Field(Field::Author), &commit.author),
        ];
        if !commit.parent_short_hashes.is_empty() {
            lines.push(DetailLine::new(
                LineKind::Field(Field::Parents),
                commit.parent_short_hashes.join(", "),
            ));
        }
        if !commit.refs.is_empty() {
            lines.push(DetailLine::new(LineKind::Field(Field::Refs), &commit.refs));
        }

        lines.push(DetailLine::blank());
        lines.push(section("Message"));
        lines.push(DetailLine::new(LineKind::Message, &commit.subject));

        let Some(diff) = commit.diff() else {
            lines.push(DetailLine::blank());
            lines.push(DetailLine::new(LineKind::Muted, LOADING_DIFF));
            return lines;
        };

        if !diff.summary.is_empty() {
            lines.push(DetailLine::blank());
            lines.push(section("Stats"));
            lines.extend(diff.summary.lines().map(|l| DetailLine::new(LineKind::Plain, l)));
        }
        if !diff.body.is_empty() {
            lines.push(DetailLine::blank());
            lines.push(section("Diff"));
            lines.extend(
                diff.body
                    .lines()
                    .map(|l| DetailLine::new(classify_patch_line(l), l)),
            );
        }
        if diff.truncated {
            lines.push(DetailLine::new(LineKind::Muted, "... diff truncated"));
        }
        lines
    }

    /// Number of lines in the detail buffer, used to clamp scrolling
    pub fn line_count(commit: &Commit) -> usize {
        Self::build(commit).len()
    }

    fn style(line: &DetailLine, theme: &Theme) -> String {
        let text = line.text.as_str();
        match line.kind {
            LineKind::Plain => text.to_string(),
            LineKind::Field(field) => {
                let (label_color, value) = match field {
                    Field::Sha => (theme.hash, theme.paint(text, theme.hash)),
                    Field::Date => (theme.date, theme.paint(text, theme.date)),
                    Field::Author => (theme.author, theme.paint(text, theme.author)),
                    Field::Parents => (theme.message, text.to_string()),
                    Field::Refs => (theme.branch, theme.bold(text, theme.branch)),
                };
                format!("{}{value}", theme.bold(field.label(), label_color))
            }
            LineKind::Section => theme.bold(text, theme.accent),
            LineKind::Message => theme.paint(text, theme.message),
            LineKind::Added => theme.paint(text, theme.added),
            LineKind::Removed => theme.paint(text, theme.removed),
            LineKind::Hunk => theme.paint(text, theme.hunk),
            LineKind::FileHeader => theme.bold(text, theme.message),
            LineKind::Muted => theme.paint(text, theme.help),
        }
    }

    /// Styled lines visible at `scroll` in a panel of `height` lines
    pub fn layout(commit: &Commit, theme: &Theme, scroll: usize, height: usize) -> Vec<String> {
        let lines = Self::build(commit);
        DetailScroll::slice(&lines, scroll, height)
            .iter()
            .map(|line| Self::style(line, theme))
            .collect()
    }
}
