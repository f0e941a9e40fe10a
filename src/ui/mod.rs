pub mod ansi;
pub mod compositor;
pub mod layout;
pub mod scroll;
mod theme;
pub mod widgets;

pub use compositor::Frame;
pub use layout::ScreenLayout;
pub use theme::Theme;
