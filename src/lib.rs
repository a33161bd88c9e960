//! SSD1306 Monochrome OLED Driver
//!
//! This crate drives page-addressed 1-bit OLED controllers (SSD1306 command
//! set) over I2C or SPI. The interesting part is the framebuffer sync engine:
//! drawing happens in a bit-packed shadow buffer and only the dirty window is
//! pushed to the panel on flush.
//!
//! # Architecture
//!
//! ```text
//! Graphics layer (embedded-graphics, app code)
//!     │  draw_horizontal_run / draw_vertical_run
//!     ▼
//! ┌─────────────────┐
//! │ Rotation Mapper │
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐    ┌──────────────┐
//! │   Framebuffer   │───▶│ Dirty Window │
//! └────────┬────────┘    └──────┬───────┘
//!          │    display()       │
//!          └────────┬───────────┘
//!                   ▼
//!          ┌─────────────────┐
//!          │ SSD1306 command │
//!          │    sequencer    │
//!          └────────┬────────┘
//!                   ▼
//!          ┌─────────────────┐
//!          │    Interface    │  (I2C / SPI / recording)
//!          └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use oled_sync::{Color, Display, DisplayConfig};
//! use oled_sync::hal::{InstantDelay, NoReset, RecordingInterface};
//!
//! let config = DisplayConfig::new(128, 32);
//! let mut display = Display::new(RecordingInterface::new(), &config).unwrap();
//! display.startup(&mut NoReset, &mut InstantDelay, None).unwrap();
//!
//! display.draw_horizontal_run(0, 0, 16, Color::White).unwrap();
//! display.display().unwrap();
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod config;
pub mod display;
pub mod hal;

// Re-export main types
pub use config::{ConfigError, DisplayConfig};
pub use display::{
    Bitmap, Color, Display, DisplayError, DisplayState, Framebuffer, Rotation, ScrollDirection,
};
pub use hal::Interface;
