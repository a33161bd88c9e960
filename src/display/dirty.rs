//! Dirty-window tracking
//!
//! Keeps the inclusive bounding box of every pixel touched since the last
//! flush, so a flush only transfers the columns and pages that changed.

/// Inclusive rectangle in physical buffer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Number of columns covered
    pub const fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    /// First and last 8-row page covered
    pub const fn pages(&self) -> (usize, usize) {
        ((self.y1 / 8) as usize, (self.y2 / 8) as usize)
    }
}

/// Bounding box of modified pixels
///
/// The empty state is the inverted sentinel `x1 > x2`, so the first
/// `expand` after a reset simply adopts the incoming rectangle.
#[derive(Debug, Clone)]
pub struct DirtyWindow {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    width: i32,
    height: i32,
}

impl DirtyWindow {
    /// Create an empty tracker for a `width` x `height` buffer
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            x1: i32::MAX,
            y1: i32::MAX,
            x2: i32::MIN,
            y2: i32::MIN,
            width: width as i32,
            height: height as i32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2
    }

    /// Current window without consuming it
    pub fn bounds(&self) -> Option<Rect> {
        if self.is_empty() {
            None
        } else {
            Some(Rect::new(self.x1, self.y1, self.x2, self.y2))
        }
    }

    /// Grow the window to the union with `(x1, y1)..=(x2, y2)`
    pub fn expand(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.x1 = self.x1.min(x1);
        self.y1 = self.y1.min(y1);
        self.x2 = self.x2.max(x2);
        self.y2 = self.y2.max(y2);
    }

    pub fn expand_rect(&mut self, rect: &Rect) {
        self.expand(rect.x1, rect.y1, rect.x2, rect.y2);
    }

    /// Cover the whole buffer
    ///
    /// Used when the panel contents can no longer be trusted to match the
    /// buffer, e.g. after a hardware scroll.
    pub fn mark_fully_dirty(&mut self) {
        self.x1 = 0;
        self.y1 = 0;
        self.x2 = self.width - 1;
        self.y2 = self.height - 1;
    }

    /// Return the current window and reset to empty
    pub fn take(&mut self) -> Option<Rect> {
        let window = self.bounds();
        self.reset();
        window
    }

    pub fn reset(&mut self) {
        self.x1 = i32::MAX;
        self.y1 = i32::MAX;
        self.x2 = i32::MIN;
        self.y2 = i32::MIN;
    }
}
