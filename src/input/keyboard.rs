//! Keyboard input handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::NavAction;
use crate::app::FocusPanel;

/// Keyboard modifier keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn from_crossterm(mods: KeyModifiers) -> Self {
        Self {
            shift: mods.contains(KeyModifiers::SHIFT),
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
        }
    }

    /// Check if only ctrl is pressed (for Ctrl+C, etc.)
    pub fn only_ctrl(&self) -> bool {
        self.ctrl && !self.shift && !self.alt
    }
}

/// Translate a key press into a navigation action
pub fn map_key(event: KeyEvent) -> Option<NavAction> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let mods = Modifiers::from_crossterm(event.modifiers);

    if mods.only_ctrl() {
        return match event.code {
            KeyCode::Char('c') => Some(NavAction::Quit),
            KeyCode::Char('d') => Some(NavAction::PageDown),
            KeyCode::Char('u') => Some(NavAction::PageUp),
            _ => None,
        };
    }
    if mods.ctrl || mods.alt {
        return None;
    }

    let action = match event.code {
        KeyCode::Char('q') | KeyCode::Esc => NavAction::Quit,
        KeyCode::Char('0') => NavAction::Focus(FocusPanel::RepoInfo),
        KeyCode::Char('1') => NavAction::Focus(FocusPanel::CommitList),
        KeyCode::Char('2') => NavAction::Focus(FocusPanel::CommitDetail),
        KeyCode::Tab => NavAction::NextFocus,
        KeyCode::Char('j') | KeyCode::Down => NavAction::Down,
        KeyCode::Char('k') | KeyCode::Up => NavAction::Up,
        KeyCode::Char('d') | KeyCode::PageDown => NavAction::PageDown,
        KeyCode::Char('u') | KeyCode::PageUp => NavAction::PageUp,
        KeyCode::Char('g') | KeyCode::Home => NavAction::Top,
        KeyCode::Char('G') | KeyCode::End => NavAction::Bottom,
        KeyCode::Char('h') | KeyCode::Left => NavAction::PanLeft,
        KeyCode::Char('l') | KeyCode::Right => NavAction::PanRight,
        KeyCode::Char('r') => NavAction::Reload,
        _ => return None,
    };
    Some(action)
}
