//! Reset line control

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use thiserror::Error;

/// The reset line could not be driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("reset pin could not be driven")]
pub struct ResetError;

/// Hardware reset of the controller
pub trait ResetControl {
    fn assert_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), ResetError>;
}

/// Panels without a wired reset line
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReset;

impl ResetControl for NoReset {
    fn assert_reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), ResetError> {
        Ok(())
    }
}

/// Active-low RES# pin
pub struct ResetPin<P> {
    pin: P,
}

impl<P: OutputPin> ResetPin<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ResetControl for ResetPin<P> {
    fn assert_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), ResetError> {
        // VDD settle, then hold RES# low for well over the 3 us minimum
        self.pin.set_high().map_err(|_| ResetError)?;
        delay.delay_ms(1);
        self.pin.set_low().map_err(|_| ResetError)?;
        delay.delay_ms(10);
        self.pin.set_high().map_err(|_| ResetError)
    }
}
