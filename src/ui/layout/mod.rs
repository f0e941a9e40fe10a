//! Layout module - rectangle math and screen layout

mod screen;

pub use screen::ScreenLayout;

/// A rectangle in terminal cells (origin top-left)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_size(width: usize, height: usize) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Take a fixed height from the top
    pub fn take_top(&self, height: usize) -> (Rect, Rect) {
        let height = height.min(self.height);
        let top = Rect::new(self.x, self.y, self.width, height);
        let bottom = Rect::new(self.x, self.y + height, self.width, self.height - height);
        (top, bottom)
    }

    /// Take a fixed height from the bottom
    pub fn take_bottom(&self, height: usize) -> (Rect, Rect) {
        let height = height.min(self.height);
        let top = Rect::new(self.x, self.y, self.width, self.height - height);
        let bottom = Rect::new(self.x, self.bottom() - height, self.width, height);
        (top, bottom)
    }

    /// Take a fixed width from the left
    pub fn take_left(&self, width: usize) -> (Rect, Rect) {
        let width = width.min(self.width);
        let left = Rect::new(self.x, self.y, width, self.height);
        let right = Rect::new(self.x + width, self.y, self.width - width, self.height);
        (left, right)
    }
}
