//! 1-bpp Page-Packed Framebuffer
//!
//! Pixels are stored the way the SSD1306 stores its GDDRAM: one byte per
//! column per 8-row page, bit `y & 7` of byte `x + (y / 8) * width` is the
//! pixel at `(x, y)`. A flush can therefore copy byte slices straight onto
//! the bus.

use alloc::vec;
use alloc::vec::Vec;

use super::dirty::DirtyWindow;
use super::rotation::{Axis, PhysicalRun};

/// Leading partial-byte masks, indexed by the number of rows left in the page
pub const PRE_MASK: [u8; 8] = [0x00, 0x80, 0xC0, 0xE0, 0xF0, 0xF8, 0xFC, 0xFE];

/// Trailing partial-byte masks, indexed by the number of rows to cover
pub const POST_MASK: [u8; 8] = [0x00, 0x01, 0x03, 0x07, 0x0F, 0x1F, 0x3F, 0x7F];

/// Pixel operation for a 1-bit display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Clear the pixel (panel off)
    Black,
    /// Set the pixel (panel lit)
    White,
    /// Toggle the pixel
    Inverse,
}

impl Color {
    #[inline]
    fn apply(self, byte: &mut u8, mask: u8) {
        match self {
            Color::White => *byte |= mask,
            Color::Black => *byte &= !mask,
            Color::Inverse => *byte ^= mask,
        }
    }
}

impl From<bool> for Color {
    fn from(on: bool) -> Self {
        if on {
            Color::White
        } else {
            Color::Black
        }
    }
}

/// Bit-packed framebuffer with dirty tracking
pub struct Framebuffer {
    width: u16,
    height: u16,
    buffer: Vec<u8>,
    dirty: DirtyWindow,
}

impl Framebuffer {
    /// Allocate a cleared framebuffer
    pub fn new(width: u16, height: u16) -> Self {
        let pages = (height as usize + 7) / 8;
        Self {
            width,
            height,
            buffer: vec![0; width as usize * pages],
            dirty: DirtyWindow::new(width, height),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of 8-row pages
    pub fn pages(&self) -> usize {
        (self.height as usize + 7) / 8
    }

    /// Raw buffer in controller layout
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// One page (8 rows) of the buffer, `width` bytes long
    ///
    /// `None` when `page` is past the last page.
    pub fn page(&self, page: usize) -> Option<&[u8]> {
        let stride = self.width as usize;
        let start = page.checked_mul(stride)?;
        self.buffer.get(start..start.checked_add(stride)?)
    }

    pub fn dirty(&self) -> &DirtyWindow {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyWindow {
        &mut self.dirty
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        x as usize + (y as usize / 8) * self.width as usize
    }

    /// Read a pixel, `None` if outside the buffer
    pub fn pixel(&self, x: i32, y: i32) -> Option<bool> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(self.buffer[self.index(x, y)] & (1 << (y & 7)) != 0)
    }

    /// Set every pixel on or off and mark the whole buffer dirty
    pub fn fill(&mut self, on: bool) {
        self.buffer.fill(if on { 0xFF } else { 0x00 });
        self.dirty.mark_fully_dirty();
    }

    pub fn clear(&mut self) {
        self.fill(false);
    }

    /// Draw a run already mapped to physical coordinates
    pub fn draw_run(&mut self, run: &PhysicalRun, color: Color) {
        match run.axis {
            Axis::Horizontal => self.set_pixel_run(run.x, run.y, run.len, color),
            Axis::Vertical => self.set_pixel_column(run.x, run.y, run.len, color),
        }
    }

    /// Horizontal run of `len` pixels starting at `(x, y)`
    ///
    /// Clipped to the buffer; zero or negative length is a no-op.
    pub fn set_pixel_run(&mut self, x: i32, y: i32, len: i32, color: Color) {
        let width = self.width as i32;
        if y < 0 || y >= self.height as i32 || len <= 0 {
            return;
        }

        let (mut x, mut len) = (x, len);
        if x < 0 {
            len = len.saturating_add(x);
            x = 0;
        }
        if x.saturating_add(len) > width {
            len = width - x;
        }
        if len <= 0 {
            return;
        }

        let start = self.index(x, y);
        let mask = 1u8 << (y & 7);
        for byte in &mut self.buffer[start..start + len as usize] {
            color.apply(byte, mask);
        }

        self.dirty.expand(x, y, x + len - 1, y);
    }

    /// Vertical run of `len` pixels starting at `(x, y)` going down
    ///
    /// Split into a masked leading byte, whole-page bytes, and a masked
    /// trailing byte.
    pub fn set_pixel_column(&mut self, x: i32, y: i32, len: i32, color: Color) {
        let height = self.height as i32;
        if x < 0 || x >= self.width as i32 || len <= 0 {
            return;
        }

        let (mut y, mut h) = (y, len);
        if y < 0 {
            h = h.saturating_add(y);
            y = 0;
        }
        if y.saturating_add(h) > height {
            h = height - y;
        }
        if h <= 0 {
            return;
        }

        self.dirty.expand(x, y, x, y + h - 1);

        let stride = self.width as usize;
        let mut idx = self.index(x, y);
        let mut h = h as usize;

        let offset = (y & 7) as usize;
        if offset != 0 {
            let lead = 8 - offset;
            let mut mask = PRE_MASK[lead];
            if h < lead {
                mask &= 0xFF >> (lead - h);
            }
            color.apply(&mut self.buffer[idx], mask);
            if h <= lead {
                return;
            }
            h -= lead;
            idx += stride;
        }

        if h >= 8 {
            match color {
                Color::Inverse => {
                    while h >= 8 {
                        self.buffer[idx] ^= 0xFF;
                        idx += stride;
                        h -= 8;
                    }
                }
                _ => {
                    let val = if color == Color::White { 0xFF } else { 0x00 };
                    while h >= 8 {
                        self.buffer[idx] = val;
                        idx += stride;
                        h -= 8;
                    }
                }
            }
        }

        if h > 0 {
            color.apply(&mut self.buffer[idx], POST_MASK[h & 7]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::dirty::Rect;

    fn lit(fb: &Framebuffer) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..fb.height() as i32 {
            for x in 0..fb.width() as i32 {
                if fb.pixel(x, y) == Some(true) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_buffer_size_rounds_up_pages() {
        let fb = Framebuffer::new(20, 12);
        assert_eq!(fb.as_bytes().len(), 40);
        assert_eq!(fb.pages(), 2);
    }

    #[test]
    fn test_page_slices() {
        let mut fb = Framebuffer::new(20, 12);
        fb.set_pixel_run(3, 9, 2, Color::White);

        assert_eq!(fb.page(0), Some(&[0u8; 20][..]));
        let page = fb.page(1).unwrap();
        assert_eq!(page.len(), 20);
        assert_eq!(&page[3..5], &[0x02, 0x02]);
        assert_eq!(fb.page(2), None);
        assert_eq!(fb.page(usize::MAX), None);
    }

    #[test]
    fn test_pixel_layout() {
        let mut fb = Framebuffer::new(128, 64);
        fb.set_pixel_run(5, 11, 1, Color::White);

        // page 1, column 5, bit 3
        assert_eq!(fb.as_bytes()[5 + 128], 0b0000_1000);
        assert_eq!(fb.pixel(5, 11), Some(true));
        assert_eq!(fb.pixel(5, 10), Some(false));
    }

    #[test]
    fn test_horizontal_clip_left() {
        let mut fb = Framebuffer::new(20, 8);
        fb.set_pixel_run(-5, 0, 10, Color::White);

        let expected: Vec<(i32, i32)> = (0..5).map(|x| (x, 0)).collect();
        assert_eq!(lit(&fb), expected);
        assert_eq!(fb.dirty().bounds(), Some(Rect::new(0, 0, 4, 0)));
    }

    #[test]
    fn test_horizontal_clip_right_and_outside() {
        let mut fb = Framebuffer::new(20, 8);
        fb.set_pixel_run(18, 2, 10, Color::White);
        assert_eq!(lit(&fb), vec![(18, 2), (19, 2)]);

        fb.dirty_mut().reset();
        fb.set_pixel_run(20, 2, 4, Color::White);
        fb.set_pixel_run(0, 8, 4, Color::White);
        fb.set_pixel_run(0, -1, 4, Color::White);
        fb.set_pixel_run(-10, 3, 5, Color::White);
        fb.set_pixel_run(0, 3, 0, Color::White);
        fb.set_pixel_run(0, 3, -4, Color::White);
        assert!(fb.dirty().is_empty());
    }

    #[test]
    fn test_inverse_twice_is_noop() {
        let mut fb = Framebuffer::new(32, 16);
        fb.set_pixel_run(3, 4, 10, Color::White);
        let before = fb.as_bytes().to_vec();

        fb.set_pixel_run(0, 4, 32, Color::Inverse);
        fb.set_pixel_column(7, 0, 16, Color::Inverse);
        fb.set_pixel_column(7, 0, 16, Color::Inverse);
        fb.set_pixel_run(0, 4, 32, Color::Inverse);

        assert_eq!(fb.as_bytes(), &before[..]);
    }

    #[test]
    fn test_white_then_black_clears_regardless_of_toggles() {
        let mut fb = Framebuffer::new(16, 16);
        fb.set_pixel_column(4, 2, 10, Color::White);
        fb.set_pixel_column(4, 0, 16, Color::Inverse);
        fb.set_pixel_column(4, 0, 16, Color::Inverse);
        fb.set_pixel_column(4, 2, 10, Color::Black);

        assert!(lit(&fb).is_empty());
    }

    #[test]
    fn test_vertical_matches_per_pixel_reference() {
        for y in -3..20 {
            for len in 0..26 {
                let mut fb = Framebuffer::new(4, 24);
                fb.set_pixel_column(1, y, len, Color::White);

                let expected: Vec<(i32, i32)> = (y..y + len)
                    .filter(|row| (0..24).contains(row))
                    .map(|row| (1, row))
                    .collect();
                assert_eq!(lit(&fb), expected, "y={} len={}", y, len);
            }
        }
    }

    #[test]
    fn test_vertical_partial_masks() {
        let mut fb = Framebuffer::new(1, 24);
        // rows 3..=4, inside page 0
        fb.set_pixel_column(0, 3, 2, Color::White);
        assert_eq!(fb.as_bytes(), &[0b0001_1000, 0, 0]);

        // rows 6..=17: tail of page 0, page 1 whole, head of page 2
        let mut fb = Framebuffer::new(1, 24);
        fb.set_pixel_column(0, 6, 12, Color::White);
        assert_eq!(fb.as_bytes(), &[0xC0, 0xFF, 0x03]);
    }

    #[test]
    fn test_vertical_black_and_inverse_whole_pages() {
        let mut fb = Framebuffer::new(1, 24);
        fb.fill(true);
        fb.set_pixel_column(0, 8, 8, Color::Black);
        assert_eq!(fb.as_bytes(), &[0xFF, 0x00, 0xFF]);

        fb.set_pixel_column(0, 4, 16, Color::Inverse);
        assert_eq!(fb.as_bytes(), &[0x0F, 0xFF, 0xF0]);
    }

    #[test]
    fn test_vertical_clip_updates_dirty() {
        let mut fb = Framebuffer::new(8, 16);
        fb.set_pixel_column(2, -4, 30, Color::White);
        assert_eq!(fb.dirty().bounds(), Some(Rect::new(2, 0, 2, 15)));

        fb.dirty_mut().reset();
        fb.set_pixel_column(8, 0, 4, Color::White);
        fb.set_pixel_column(-1, 0, 4, Color::White);
        fb.set_pixel_column(0, 16, 4, Color::White);
        assert!(fb.dirty().is_empty());
    }

    #[test]
    fn test_fill_marks_everything_dirty() {
        let mut fb = Framebuffer::new(16, 8);
        fb.fill(true);
        assert!(fb.as_bytes().iter().all(|b| *b == 0xFF));
        assert_eq!(fb.dirty().bounds(), Some(Rect::new(0, 0, 15, 7)));

        fb.clear();
        assert!(fb.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_pixel_out_of_range() {
        let fb = Framebuffer::new(16, 8);
        assert_eq!(fb.pixel(-1, 0), None);
        assert_eq!(fb.pixel(16, 0), None);
        assert_eq!(fb.pixel(0, 8), None);
    }
}
