//! `embedded-graphics` integration
//!
//! Lines, shapes and text from `embedded-graphics` reach the panel through
//! the same horizontal-run primitive as everything else, so rotation and
//! dirty tracking apply unchanged.

use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::{OriginDimensions, Size};
use embedded_graphics_core::pixelcolor::BinaryColor;
use embedded_graphics_core::primitives::Rectangle;
use embedded_graphics_core::Pixel;

use super::{Color, Display, DisplayError};
use crate::hal::Interface;

impl From<BinaryColor> for Color {
    fn from(color: BinaryColor) -> Self {
        Color::from(color.is_on())
    }
}

impl<DI: Interface> OriginDimensions for Display<DI> {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl<DI: Interface> DrawTarget for Display<DI> {
    type Color = BinaryColor;
    type Error = DisplayError<DI::Error>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.into())?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width.min(i32::MAX as u32) as i32,
            area.size.height.min(i32::MAX as u32) as i32,
            color.into(),
        )
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.is_on())
    }
}
