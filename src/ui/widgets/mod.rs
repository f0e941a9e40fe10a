//! Widget implementations

mod header_bar;
mod panel;
mod shortcut_bar;

pub use header_bar::HeaderBar;
pub use panel::Panel;
pub use shortcut_bar::{ShortcutBar, ShortcutContext};
