//! ANSI-aware measurement and editing of styled terminal text.
//!
//! A CSI escape sequence (`ESC [`, parameter and intermediate bytes in
//! `0x20..=0x3F`, one final byte in `0x40..=0x7E`) is treated as a single
//! opaque unit with no width. Every edit in this module copies such units
//! verbatim; only visible characters are counted, cut or replaced.

use unicode_width::UnicodeWidthChar;

pub const ESC: char = '\x1b';

/// Resets all colors and attributes
pub const RESET: &str = "\x1b[0m";

/// A piece of styled text: an escape sequence or one visible character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Escape(&'a str),
    Char(char),
}

/// Iterator over the [`Segment`]s of a string
pub struct Segments<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let c = rest.chars().next()?;

        if c == ESC && rest.as_bytes().get(1) == Some(&b'[') {
            let bytes = rest.as_bytes();
            let mut end = 2;
            while end < bytes.len() {
                let b = bytes[end];
                if (0x40..=0x7E).contains(&b) {
                    end += 1;
                    break;
                }
                if !(0x20..=0x3F).contains(&b) {
                    // Malformed: the sequence ends before the offending byte
                    break;
                }
                end += 1;
            }
            self.pos += end;
            return Some(Segment::Escape(&rest[..end]));
        }

        self.pos += c.len_utf8();
        Some(Segment::Char(c))
    }
}

pub fn segments(text: &str) -> Segments<'_> {
    Segments { text, pos: 0 }
}

/// Columns a character occupies; control characters occupy none
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Visible columns of `text`, escape sequences excluded
pub fn visible_width(text: &str) -> usize {
    segments(text)
        .map(|s| match s {
            Segment::Char(c) => char_width(c),
            Segment::Escape(_) => 0,
        })
        .sum()
}

/// Number of lines in `text`. Escape sequences never contribute a line break.
pub fn line_height(text: &str) -> usize {
    1 + segments(text)
        .filter(|s| matches!(s, Segment::Char('\n')))
        .count()
}

/// Split styled text into lines without splitting any escape sequence
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for segment in segments(text) {
        match segment {
            Segment::Char('\n') => lines.push(std::mem::take(&mut current)),
            Segment::Char(c) => current.push(c),
            Segment::Escape(seq) => current.push_str(seq),
        }
    }
    lines.push(current);
    lines
}

/// The text with every escape sequence removed
pub fn strip(text: &str) -> String {
    segments(text)
        .filter_map(|s| match s {
            Segment::Char(c) => Some(c),
            Segment::Escape(_) => None,
        })
        .collect()
}

/// Cut `text` to at most `width` visible columns.
///
/// All escape sequences are kept, including those after the cut, so styles
/// opened or closed later in the line stay balanced.
pub fn truncate(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut col = 0;
    let mut full = false;
    for segment in segments(text) {
        match segment {
            Segment::Escape(seq) => out.push_str(seq),
            Segment::Char(c) => {
                if full {
                    continue;
                }
                let w = char_width(c);
                if col + w > width {
                    full = true;
                    continue;
                }
                col += w;
                out.push(c);
            }
        }
    }
    out
}

/// Cut or right-pad `text` to exactly `width` visible columns
pub fn fit_width(text: &str, width: usize) -> String {
    let mut out = truncate(text, width);
    let used = visible_width(&out);
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}

/// Replace visible characters of `line`, starting after the first `skip`
/// visible characters, with the characters of `label` one for one. At most
/// `limit` characters are replaced; the rest of the label is dropped.
/// Zero-width characters are copied and never counted.
pub fn overlay(line: &str, label: &str, skip: usize, limit: usize) -> String {
    let mut label_chars = label.chars().take(limit);
    let mut out = String::with_capacity(line.len() + label.len());
    let mut visible = 0;
    for segment in segments(line) {
        match segment {
            Segment::Escape(seq) => out.push_str(seq),
            Segment::Char(c) if char_width(c) == 0 => out.push(c),
            Segment::Char(c) => {
                let replacement = if visible >= skip { label_chars.next() } else { None };
                out.push(replacement.unwrap_or(c));
                visible += 1;
            }
        }
    }
    out
}

/// Make untrusted text safe to measure: tabs become spaces, other control
/// characters (including raw escapes) are removed.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => out.push_str("    "),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// [`sanitize`] each line of multi-line text
pub fn sanitize_lines(text: &str) -> Vec<String> {
    text.lines().map(sanitize).collect()
}
