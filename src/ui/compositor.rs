//! Exact-size composition of styled text blocks into a terminal frame.

use tracing::debug;

use super::ansi;

/// `width` spaces
pub fn blank(width: usize) -> String {
    " ".repeat(width)
}

/// Fit unbordered content to exactly `height` lines of `width` columns.
/// Excess lines are cut from the end.
pub fn fit_lines(lines: &[String], width: usize, height: usize) -> Vec<String> {
    let mut out: Vec<String> = lines
        .iter()
        .take(height)
        .map(|line| ansi::fit_width(line, width))
        .collect();
    out.resize_with(height, || blank(width));
    out
}

/// Fit a bordered block to exactly `height` lines of `width` columns.
///
/// The first and last line are kept when the block is too tall, so the top
/// and bottom border survive; excess lines are dropped from the end of the
/// middle.
pub fn fit_frame_height(lines: &[String], width: usize, height: usize) -> Vec<String> {
    if lines.len() <= height || height < 2 {
        return fit_lines(lines, width, height);
    }
    debug!("cutting block of {} lines to {height}", lines.len());

    let mut kept = Vec::with_capacity(height);
    kept.push(lines[0].clone());
    kept.extend(lines[1..height - 1].iter().cloned());
    kept.push(lines[lines.len() - 1].clone());
    fit_lines(&kept, width, height)
}

/// Overlay `label` onto a border line right after its first corner.
/// The last visible character is never replaced.
pub fn add_box_label(line: &str, label: &str) -> String {
    let visible = ansi::strip(line)
        .chars()
        .filter(|&c| ansi::char_width(c) > 0)
        .count();
    if visible < 3 {
        return line.to_string();
    }
    ansi::overlay(line, label, 1, visible - 2)
}

/// A block of lines with a known width
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub width: usize,
    pub lines: Vec<String>,
}

impl Block {
    pub fn new(width: usize, lines: Vec<String>) -> Self {
        Self { width, lines }
    }
}

/// Join blocks left to right at equal height. Shorter blocks are padded
/// with blank lines of their own width.
pub fn join_horizontal(blocks: &[Block]) -> Vec<String> {
    let height = blocks.iter().map(|b| b.lines.len()).max().unwrap_or(0);
    (0..height)
        .map(|row| {
            blocks
                .iter()
                .map(|b| match b.lines.get(row) {
                    Some(line) => ansi::fit_width(line, b.width),
                    None => blank(b.width),
                })
                .collect()
        })
        .collect()
}

/// One complete screen of output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub lines: Vec<String>,
}

impl Frame {
    /// Stack header, body and footer and force the result to the terminal size
    pub fn compose(
        width: usize,
        height: usize,
        header: &[String],
        body: &[String],
        footer: &[String],
    ) -> Self {
        let stacked: Vec<String> = header
            .iter()
            .chain(body)
            .chain(footer)
            .flat_map(|chunk| ansi::split_lines(chunk))
            .collect();
        Self {
            width,
            height,
            lines: fit_frame_height(&stacked, width, height),
        }
    }

    /// A frame holding a short message on its first line
    pub fn message(width: usize, height: usize, text: &str) -> Self {
        Self {
            width,
            height,
            lines: fit_lines(&[text.to_string()], width, height),
        }
    }

    /// Frame drawn when the terminal is too small for the panels
    pub fn placeholder(width: usize, height: usize) -> Self {
        Self::message(width, height, "Terminal too small")
    }

    /// Number of lines as a terminal would display them
    pub fn line_height(&self) -> usize {
        ansi::line_height(&self.to_string())
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RED: &str = "\x1b[31m";

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fit_lines_pads_and_cuts() {
        let fitted = fit_lines(&lines(&["abc", "defghij"]), 4, 3);
        assert_eq!(fitted, lines(&["abc ", "defg", "    "]));

        let fitted = fit_lines(&lines(&["1", "2", "3"]), 1, 2);
        assert_eq!(fitted, lines(&["1", "2"]));
    }

    #[test]
    fn test_fit_frame_keeps_borders() {
        let block = lines(&["╭──╮", "│a │", "│b │", "│c │", "╰──╯"]);
        let fitted = fit_frame_height(&block, 4, 4);
        assert_eq!(fitted, lines(&["╭──╮", "│a │", "│b │", "╰──╯"]));
    }

    #[test]
    fn test_fit_frame_tiny_height() {
        let block = lines(&["top", "mid", "bot"]);
        assert_eq!(fit_frame_height(&block, 3, 1), lines(&["top"]));
        assert_eq!(fit_frame_height(&block, 3, 0), Vec::<String>::new());
        assert_eq!(fit_frame_height(&block, 3, 2), lines(&["top", "bot"]));
    }

    #[test]
    fn test_add_box_label() {
        assert_eq!(add_box_label("╭────────╮", "[1]"), "╭[1]─────╮");
        assert_eq!(add_box_label("╭───╮", "[10]"), "╭[10╮");
        assert_eq!(add_box_label("╭╮", "[1]"), "╭╮");
    }

    #[test]
    fn test_add_box_label_styled_border() {
        let border = format!("{RED}╭──────╮\x1b[0m");
        let labeled = add_box_label(&border, "[0]");
        assert!(labeled.starts_with(RED));
        assert!(labeled.ends_with("\x1b[0m"));
        assert_eq!(ansi::strip(&labeled), "╭[0]───╮");
    }

    #[test]
    fn test_join_horizontal() {
        let joined = join_horizontal(&[
            Block::new(3, lines(&["ab", "cd"])),
            Block::new(2, lines(&["x"])),
        ]);
        assert_eq!(joined, lines(&["ab x ", "cd   "]));
    }

    #[test]
    fn test_compose_is_exact() {
        let frame = Frame::compose(
            10,
            5,
            &lines(&["head\nline"]),
            &lines(&["body"]),
            &lines(&["foot"]),
        );
        assert_eq!(frame.lines.len(), 5);
        assert_eq!(ansi::strip(&frame.lines[1]), "line      ");
        assert_eq!(frame.line_height(), 5);
    }

    #[test]
    fn test_compose_overflow_keeps_footer() {
        let body: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let frame = Frame::compose(4, 6, &lines(&["head"]), &body, &lines(&["foot"]));
        assert_eq!(frame.lines.first().map(String::as_str), Some("head"));
        assert_eq!(frame.lines.last().map(String::as_str), Some("foot"));
        assert_eq!(frame.lines.len(), 6);
    }

    #[test]
    fn test_placeholder_size() {
        let frame = Frame::placeholder(15, 5);
        assert_eq!(frame.lines.len(), 5);
        assert!(frame.lines.iter().all(|l| ansi::visible_width(l) == 15));
    }

    proptest! {
        #[test]
        fn prop_frame_is_exact(
            body in proptest::collection::vec("[a-z│●日 ]{0,40}", 0..60),
            width in 1usize..120,
            height in 1usize..60,
        ) {
            let frame = Frame::compose(width, height, &[], &body, &[]);
            prop_assert_eq!(frame.lines.len(), height);
            prop_assert_eq!(frame.line_height(), height);
            for line in &frame.lines {
                prop_assert_eq!(ansi::visible_width(line), width);
            }
        }
    }
}
