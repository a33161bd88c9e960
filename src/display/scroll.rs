//! Hardware auto-scroll commands
//!
//! Each scroll request is self-contained: stop any running scroll, set the
//! vertical scroll area to the full panel, program the direction and page
//! range, then activate.

use log::warn;
use thiserror::Error;

use super::ssd1306::cmd;

/// Frame interval between scroll steps (`0b000` = 5 frames)
pub const FRAME_CODE: u8 = 0x00;

/// Page field is three bits wide
const PAGE_MASK: u8 = 0x07;

/// Bytes in an encoded scroll request
pub const SCROLL_SEQUENCE_LEN: usize = 13;

/// Scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Left,
    Right,
    LeftDiagonal,
    RightDiagonal,
    Up,
}

impl ScrollDirection {
    pub const fn opcode(self) -> u8 {
        match self {
            ScrollDirection::Right => cmd::RIGHT_HORIZONTAL_SCROLL,
            ScrollDirection::Left => cmd::LEFT_HORIZONTAL_SCROLL,
            ScrollDirection::RightDiagonal | ScrollDirection::Up => {
                cmd::VERTICAL_RIGHT_HORIZONTAL_SCROLL
            }
            ScrollDirection::LeftDiagonal => cmd::VERTICAL_LEFT_HORIZONTAL_SCROLL,
        }
    }

    /// Horizontal step; `Up` reuses the diagonal opcode with it switched off
    pub const fn horizontal_increment(self) -> u8 {
        match self {
            ScrollDirection::LeftDiagonal | ScrollDirection::RightDiagonal => 1,
            _ => 0,
        }
    }

    pub const fn vertical_increment(self) -> u8 {
        match self {
            ScrollDirection::Left | ScrollDirection::Right => 0,
            _ => 1,
        }
    }
}

/// Start page after stop page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scroll page range {start}..={stop} is invalid")]
pub struct ScrollRangeError {
    pub start: u8,
    pub stop: u8,
}

/// A validated scroll request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCommand {
    pub direction: ScrollDirection,
    pub start_page: u8,
    pub stop_page: u8,
}

impl ScrollCommand {
    /// Build a scroll request
    ///
    /// Pages are masked to the controller's 3-bit page field; bits above
    /// it are ignored by the hardware anyway.
    pub fn new(direction: ScrollDirection, start: u8, stop: u8) -> Result<Self, ScrollRangeError> {
        let (start_page, stop_page) = (start & PAGE_MASK, stop & PAGE_MASK);
        if start_page != start || stop_page != stop {
            warn!(
                "scroll pages {}..={} truncated to {}..={}",
                start,
                stop,
                start_page,
                stop_page
            );
        }
        if start_page > stop_page {
            return Err(ScrollRangeError { start: start_page, stop: stop_page });
        }

        Ok(Self { direction, start_page, stop_page })
    }

    /// Full command sequence for a `width` x `height` panel
    pub fn encode(&self, width: u16, height: u16) -> [u8; SCROLL_SEQUENCE_LEN] {
        [
            cmd::DEACTIVATE_SCROLL,
            cmd::SET_VERTICAL_SCROLL_AREA,
            0x00,
            height as u8,
            self.direction.opcode(),
            self.direction.horizontal_increment(),
            self.start_page,
            FRAME_CODE,
            self.stop_page,
            self.direction.vertical_increment(),
            0x00,
            width.saturating_sub(1) as u8,
            cmd::ACTIVATE_SCROLL,
        ]
    }
}
