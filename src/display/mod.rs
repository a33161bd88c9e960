//! Display driver and framebuffer sync engine
//!
//! [`Display`] owns the transport, the bit-packed framebuffer and the
//! panel tuning. Drawing only touches memory; [`Display::display`] pushes
//! the dirty window to the panel one page at a time.
//!
//! A flush that is interrupted half-way (panic, power loss) leaves the
//! panel and the framebuffer out of sync. A flush that fails with a
//! transport error keeps the window dirty so the next flush resends it.
//!
//! `Display` has no internal locking. Sharing one across threads needs a
//! single external lock around every call.

pub mod dirty;
pub mod framebuffer;
#[cfg(feature = "graphics")]
pub mod graphics;
pub mod rotation;
pub mod scroll;
pub mod ssd1306;

pub use dirty::{DirtyWindow, Rect};
pub use framebuffer::{Color, Framebuffer};
pub use rotation::Rotation;
pub use scroll::{ScrollCommand, ScrollDirection, ScrollRangeError};
pub use ssd1306::PanelConfig;

use embedded_hal::delay::DelayNs;
use log::{debug, info, trace};
use thiserror::Error;

use crate::config::DisplayConfig;
use crate::hal::{Interface, ResetControl, ResetError};
use ssd1306::cmd;

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Uninitialized,
    Starting,
    Active,
    ShuttingDown,
    Stopped,
}

/// Display errors
#[derive(Debug, Error)]
pub enum DisplayError<E> {
    #[error("`{op}` is not allowed while the display is {state:?}")]
    InvalidState { op: &'static str, state: DisplayState },

    #[error("invalid geometry {width}x{height}")]
    InvalidGeometry { width: i32, height: i32 },

    #[error(transparent)]
    InvalidScrollRange(#[from] ScrollRangeError),

    #[error(transparent)]
    Reset(#[from] ResetError),

    #[error("transport error: {0:?}")]
    Transport(E),
}

/// Row-major 1-bpp bitmap, MSB first, rows padded to whole bytes
#[derive(Debug, Clone, Copy)]
pub struct Bitmap<'a> {
    pub width: u16,
    pub height: u16,
    pub bits: &'a [u8],
}

impl<'a> Bitmap<'a> {
    pub const fn new(width: u16, height: u16, bits: &'a [u8]) -> Self {
        Self { width, height, bits }
    }

    const fn stride(&self) -> usize {
        (self.width as usize + 7) / 8
    }

    /// Whether the bit at `(x, y)` is set; short data reads as unset
    pub fn is_set(&self, x: u16, y: u16) -> bool {
        let idx = y as usize * self.stride() + x as usize / 8;
        self.bits
            .get(idx)
            .map(|byte| byte & (0x80 >> (x & 7)) != 0)
            .unwrap_or(false)
    }
}

/// SSD1306 display
pub struct Display<DI> {
    interface: DI,
    framebuffer: Framebuffer,
    panel: PanelConfig,
    rotation: Rotation,
    state: DisplayState,
    scrolling: bool,
}

impl<DI: Interface> Display<DI> {
    /// Create a display for the configured panel
    ///
    /// Nothing is sent on the bus until [`Display::startup`].
    pub fn new(interface: DI, config: &DisplayConfig) -> Result<Self, DisplayError<DI::Error>> {
        if !ssd1306::is_supported_size(config.width, config.height) {
            return Err(DisplayError::InvalidGeometry {
                width: config.width as i32,
                height: config.height as i32,
            });
        }

        let panel = PanelConfig::new(config.width, config.height, config.external_vcc);
        debug!(
            "panel {}x{}: contrast {:#04x}, com pins {:#04x}, charge pump {:#04x}",
            panel.width, panel.height, panel.contrast, panel.com_pins, panel.charge_pump
        );

        Ok(Self {
            interface,
            framebuffer: Framebuffer::new(config.width, config.height),
            panel,
            rotation: Rotation::from_quarter_turns(config.rotation as i32),
            state: DisplayState::Uninitialized,
            scrolling: false,
        })
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn panel(&self) -> &PanelConfig {
        &self.panel
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn interface(&self) -> &DI {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut DI {
        &mut self.interface
    }

    /// Hand back the transport
    pub fn release(self) -> DI {
        self.interface
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Logical width under the current rotation
    pub fn width(&self) -> u16 {
        if self.rotation.swaps_axes() {
            self.panel.height
        } else {
            self.panel.width
        }
    }

    /// Logical height under the current rotation
    pub fn height(&self) -> u16 {
        if self.rotation.swaps_axes() {
            self.panel.width
        } else {
            self.panel.height
        }
    }

    /// Whether a hardware scroll was started and not stopped
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    fn ensure_active(&self, op: &'static str) -> Result<(), DisplayError<DI::Error>> {
        if self.state == DisplayState::Active {
            Ok(())
        } else {
            Err(DisplayError::InvalidState { op, state: self.state })
        }
    }

    fn send_commands(&mut self, commands: &[u8]) -> Result<(), DisplayError<DI::Error>> {
        trace!("cmd {:02x?}", commands);
        self.interface.send_commands(commands).map_err(DisplayError::Transport)
    }

    /// Reset and initialize the panel, then show the framebuffer
    ///
    /// `splash` is drawn centered before the first flush. A transport or
    /// reset failure aborts startup and leaves the display
    /// `Uninitialized` so it can be retried.
    pub fn startup<R, D>(
        &mut self,
        reset: &mut R,
        delay: &mut D,
        splash: Option<&Bitmap<'_>>,
    ) -> Result<(), DisplayError<DI::Error>>
    where
        R: ResetControl,
        D: DelayNs,
    {
        if self.state != DisplayState::Uninitialized {
            return Err(DisplayError::InvalidState { op: "startup", state: self.state });
        }

        self.state = DisplayState::Starting;
        info!("starting {}x{} panel", self.panel.width, self.panel.height);

        match self.run_startup(reset, delay, splash) {
            Ok(()) => {
                self.state = DisplayState::Active;
                info!("display active");
                Ok(())
            }
            Err(e) => {
                self.state = DisplayState::Uninitialized;
                Err(e)
            }
        }
    }

    fn run_startup<R: ResetControl, D: DelayNs>(
        &mut self,
        reset: &mut R,
        delay: &mut D,
        splash: Option<&Bitmap<'_>>,
    ) -> Result<(), DisplayError<DI::Error>> {
        reset.assert_reset(delay)?;

        let init = self.panel.init_sequence();
        debug!("init sequence: {:02x?}", init);
        self.send_commands(&init)?;

        if let Some(bitmap) = splash {
            self.blit(bitmap);
        }

        self.framebuffer.dirty_mut().mark_fully_dirty();
        self.flush()?;

        self.send_commands(&[cmd::DISPLAY_ON])
    }

    /// Centered physical-orientation blit used for the startup splash
    fn blit(&mut self, bitmap: &Bitmap<'_>) {
        let x0 = (self.panel.width as i32 - bitmap.width as i32) / 2;
        let y0 = (self.panel.height as i32 - bitmap.height as i32) / 2;
        for y in 0..bitmap.height {
            for x in 0..bitmap.width {
                if bitmap.is_set(x, y) {
                    self.framebuffer
                        .set_pixel_run(x0 + x as i32, y0 + y as i32, 1, Color::White);
                }
            }
        }
    }

    /// Stop scrolling, switch the panel off and release the transport
    pub fn shutdown(&mut self) -> Result<(), DisplayError<DI::Error>> {
        match self.state {
            DisplayState::Active | DisplayState::ShuttingDown => {}
            state => return Err(DisplayError::InvalidState { op: "shutdown", state }),
        }

        self.state = DisplayState::ShuttingDown;
        info!("shutting down display");

        self.send_commands(&[cmd::DEACTIVATE_SCROLL])?;
        self.scrolling = false;
        self.send_commands(&[cmd::DISPLAY_OFF])?;
        self.interface.release().map_err(DisplayError::Transport)?;

        self.state = DisplayState::Stopped;
        Ok(())
    }

    /// Push the dirty window to the panel
    pub fn display(&mut self) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("display")?;
        self.flush()
    }

    fn flush(&mut self) -> Result<(), DisplayError<DI::Error>> {
        let Some(window) = self.framebuffer.dirty_mut().take() else {
            trace!("flush: nothing dirty");
            return Ok(());
        };

        debug!(
            "flush: columns {}..={}, rows {}..={}",
            window.x1, window.x2, window.y1, window.y2
        );

        if let Err(e) = self.transfer(&window) {
            // Panel may hold a partial update; resend the whole window next time
            self.framebuffer.dirty_mut().expand_rect(&window);
            return Err(e);
        }
        Ok(())
    }

    fn transfer(&mut self, window: &Rect) -> Result<(), DisplayError<DI::Error>> {
        let (first, last) = window.pages();
        let (x1, x2) = (window.x1 as usize, window.x2 as usize);

        for page in first..=last {
            let addressing = ssd1306::page_window(page as u8, x1 as u8, x2 as u8);
            trace!("page {}: {:02x?}", page, addressing);
            self.interface
                .send_commands(&addressing)
                .map_err(DisplayError::Transport)?;
            // The window is always inside the buffer
            let Some(columns) = self.framebuffer.page(page).and_then(|p| p.get(x1..=x2)) else {
                continue;
            };
            self.interface
                .send_data(columns)
                .map_err(DisplayError::Transport)?;
        }
        Ok(())
    }

    /// Change the logical orientation; any integer, reduced modulo 4
    pub fn set_rotation(&mut self, quarter_turns: i32) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("set_rotation")?;
        self.rotation = Rotation::from_quarter_turns(quarter_turns);
        debug!("rotation set to {:?}", self.rotation);
        Ok(())
    }

    /// Logical horizontal run, the primitive graphics libraries build on
    pub fn draw_horizontal_run(
        &mut self,
        x: i32,
        y: i32,
        len: i32,
        color: Color,
    ) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("draw_horizontal_run")?;
        if len <= 0 {
            return Ok(());
        }
        if let Some(run) = rotation::map_horizontal(
            self.rotation,
            self.panel.width as i32,
            self.panel.height as i32,
            x,
            y,
            len,
        ) {
            self.framebuffer.draw_run(&run, color);
        }
        Ok(())
    }

    /// Logical vertical run
    pub fn draw_vertical_run(
        &mut self,
        x: i32,
        y: i32,
        len: i32,
        color: Color,
    ) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("draw_vertical_run")?;
        if len <= 0 {
            return Ok(());
        }
        if let Some(run) = rotation::map_vertical(
            self.rotation,
            self.panel.width as i32,
            self.panel.height as i32,
            x,
            y,
            len,
        ) {
            self.framebuffer.draw_run(&run, color);
        }
        Ok(())
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<(), DisplayError<DI::Error>> {
        self.draw_horizontal_run(x, y, 1, color)
    }

    /// Fill a logical rectangle; negative sizes are rejected
    pub fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
    ) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("fill_rect")?;
        if width < 0 || height < 0 {
            return Err(DisplayError::InvalidGeometry { width, height });
        }
        if width == 0 || height == 0 {
            return Ok(());
        }

        // Only rows inside the logical area can draw anything
        let first = y.max(0);
        let end = (i64::from(y) + i64::from(height)).min(i64::from(self.height())) as i32;
        for row in first..end {
            self.draw_horizontal_run(x, row, width, color)?;
        }
        Ok(())
    }

    /// Read a logical pixel, `None` outside the visible area
    pub fn pixel(&self, x: i32, y: i32) -> Option<bool> {
        let run = rotation::map_horizontal(
            self.rotation,
            self.panel.width as i32,
            self.panel.height as i32,
            x,
            y,
            1,
        )?;
        self.framebuffer.pixel(run.x, run.y)
    }

    /// Clear the framebuffer; shown on the next flush
    pub fn clear_display(&mut self) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("clear_display")?;
        self.framebuffer.clear();
        Ok(())
    }

    /// Set every pixel on or off; shown on the next flush
    pub fn fill(&mut self, on: bool) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("fill")?;
        self.framebuffer.fill(on);
        Ok(())
    }

    pub fn enable_display(&mut self, on: bool) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("enable_display")?;
        self.send_commands(&[if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF }])
    }

    /// Hardware inversion; the framebuffer is untouched
    pub fn invert_display(&mut self, invert: bool) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("invert_display")?;
        self.send_commands(&[if invert { cmd::INVERT_DISPLAY } else { cmd::NORMAL_DISPLAY }])
    }

    /// Drop contrast to zero, or restore the panel contrast
    pub fn dim(&mut self, dim: bool) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("dim")?;
        let value = if dim { 0x00 } else { self.panel.contrast };
        self.send_commands(&ssd1306::contrast(value))
    }

    /// Send raw command bytes
    pub fn command(&mut self, commands: &[u8]) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("command")?;
        self.send_commands(commands)
    }

    /// Start a hardware scroll over pages `start_page..=stop_page`
    pub fn start_scroll(
        &mut self,
        direction: ScrollDirection,
        start_page: u8,
        stop_page: u8,
    ) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("start_scroll")?;
        let scroll = ScrollCommand::new(direction, start_page, stop_page)?;
        debug!(
            "scroll {:?} pages {}..={}",
            direction, scroll.start_page, scroll.stop_page
        );
        self.send_commands(&scroll.encode(self.panel.width, self.panel.height))?;
        self.scrolling = true;
        Ok(())
    }

    pub fn start_scroll_left(&mut self, start_page: u8, stop_page: u8) -> Result<(), DisplayError<DI::Error>> {
        self.start_scroll(ScrollDirection::Left, start_page, stop_page)
    }

    pub fn start_scroll_right(&mut self, start_page: u8, stop_page: u8) -> Result<(), DisplayError<DI::Error>> {
        self.start_scroll(ScrollDirection::Right, start_page, stop_page)
    }

    pub fn start_scroll_diag_left(&mut self, start_page: u8, stop_page: u8) -> Result<(), DisplayError<DI::Error>> {
        self.start_scroll(ScrollDirection::LeftDiagonal, start_page, stop_page)
    }

    pub fn start_scroll_diag_right(&mut self, start_page: u8, stop_page: u8) -> Result<(), DisplayError<DI::Error>> {
        self.start_scroll(ScrollDirection::RightDiagonal, start_page, stop_page)
    }

    pub fn start_scroll_up(&mut self, start_page: u8, stop_page: u8) -> Result<(), DisplayError<DI::Error>> {
        self.start_scroll(ScrollDirection::Up, start_page, stop_page)
    }

    /// Stop scrolling
    ///
    /// The panel RAM has been shifted by the controller, so the whole
    /// framebuffer is marked dirty for the next flush.
    pub fn stop_scroll(&mut self) -> Result<(), DisplayError<DI::Error>> {
        self.ensure_active("stop_scroll")?;
        self.send_commands(&[cmd::DEACTIVATE_SCROLL])?;
        self.scrolling = false;
        self.framebuffer.dirty_mut().mark_fully_dirty();
        Ok(())
    }
}
