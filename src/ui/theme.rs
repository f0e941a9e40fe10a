//! Color palette for the terminal UI

use crossterm::style::{Color, Stylize};

/// Immutable set of colors handed to every render call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub hash: Color,
    pub author: Color,
    pub date: Color,
    pub message: Color,
    pub branch: Color,
    pub help: Color,
    pub selected_bg: Color,
    pub border_focused: Color,
    pub border_unfocused: Color,
    pub added: Color,
    pub removed: Color,
    pub hunk: Color,
    pub error: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb {
        r: (hex >> 16) as u8,
        g: (hex >> 8) as u8,
        b: hex as u8,
    }
}

impl Theme {
    pub const fn dark() -> Self {
        Self {
            accent: rgb(0x7D56F4),          // purple
            hash: rgb(0xFFA500),            // orange
            author: rgb(0x7DD3FC),          // sky blue
            date: rgb(0xA3BE8C),            // sage green
            message: rgb(0xE5E9F0),         // off-white
            branch: rgb(0x88C0D0),          // frost
            help: rgb(0x626262),            // dim gray
            selected_bg: rgb(0x3C3C3C),
            border_focused: rgb(0xFFA500),
            border_unfocused: rgb(0x7D56F4),
            added: rgb(0xA3BE8C),
            removed: rgb(0xBF616A),
            hunk: rgb(0x5E81AC),
            error: rgb(0xFF0000),
        }
    }

    /// Foreground-colored text
    pub fn paint(&self, text: &str, color: Color) -> String {
        text.with(color).to_string()
    }

    /// Bold foreground-colored text
    pub fn bold(&self, text: &str, color: Color) -> String {
        text.with(color).bold().to_string()
    }

    /// Foreground-colored text on the selection background
    pub fn highlight(&self, text: &str, color: Color) -> String {
        text.with(color).on(self.selected_bg).to_string()
    }

    pub fn border(&self, focused: bool) -> Color {
        if focused {
            self.border_focused
        } else {
            self.border_unfocused
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ansi;

    #[test]
    fn test_rgb_unpacks_channels() {
        assert_eq!(rgb(0x7D56F4), Color::Rgb { r: 0x7D, g: 0x56, b: 0xF4 });
    }

    #[test]
    fn test_painted_text_keeps_visible_width() {
        let theme = Theme::dark();
        for styled in [
            theme.paint("abc1234", theme.hash),
            theme.bold("main", theme.branch),
            theme.highlight("selected", theme.hash),
        ] {
            let plain = ansi::strip(&styled);
            assert_eq!(ansi::visible_width(&styled), plain.chars().count());
        }
        assert_eq!(ansi::strip(&theme.paint("abc1234", theme.hash)), "abc1234");
    }

    #[test]
    fn test_border_follows_focus() {
        let theme = Theme::default();
        assert_eq!(theme.border(true), theme.border_focused);
        assert_eq!(theme.border(false), theme.border_unfocused);
    }
}
