//! Input handling for gitraffe
//!
//! Translates crossterm key events into navigation actions for the update loop.

mod keyboard;

pub use keyboard::map_key;

use crate::app::FocusPanel;

/// A discrete navigation request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
    /// Reveal connector columns on the left
    PanLeft,
    /// Hide connector columns on the left
    PanRight,
    Focus(FocusPanel),
    NextFocus,
    Reload,
    Quit,
}
