//! 4-wire SPI transport
//!
//! The D/C# pin selects between command (low) and data (high) bytes; chip
//! select is owned by the `SpiDevice`.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use thiserror::Error;

use super::Interface;

/// SPI transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpiInterfaceError<SE, PE> {
    #[error("SPI write failed: {0:?}")]
    Spi(SE),
    #[error("D/C pin could not be driven: {0:?}")]
    DataCommandPin(PE),
}

/// SSD1306 over 4-wire SPI
pub struct SpiInterface<SPI, DC> {
    spi: SPI,
    dc: DC,
}

impl<SPI: SpiDevice, DC: OutputPin> SpiInterface<SPI, DC> {
    pub fn new(spi: SPI, dc: DC) -> Self {
        Self { spi, dc }
    }

    pub fn into_inner(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }
}

impl<SPI: SpiDevice, DC: OutputPin> Interface for SpiInterface<SPI, DC> {
    type Error = SpiInterfaceError<SPI::Error, DC::Error>;

    fn send_commands(&mut self, commands: &[u8]) -> Result<(), Self::Error> {
        self.dc.set_low().map_err(SpiInterfaceError::DataCommandPin)?;
        self.spi.write(commands).map_err(SpiInterfaceError::Spi)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.dc.set_high().map_err(SpiInterfaceError::DataCommandPin)?;
        self.spi.write(data).map_err(SpiInterfaceError::Spi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use embedded_hal::digital::{self, ErrorType as PinErrorType};
    use embedded_hal::spi::{self, ErrorType as SpiErrorType, Operation};

    /// Shared wire log: (dc level, bytes)
    type Wire = RefCell<Vec<(bool, Vec<u8>)>>;

    struct Device<'a> {
        wire: &'a Wire,
        dc: &'a RefCell<bool>,
    }

    struct DcPin<'a> {
        level: &'a RefCell<bool>,
    }

    impl SpiErrorType for Device<'_> {
        type Error = spi::ErrorKind;
    }

    impl SpiDevice for Device<'_> {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            for op in operations.iter() {
                match op {
                    Operation::Write(buf) => {
                        self.wire.borrow_mut().push((*self.dc.borrow(), buf.to_vec()))
                    }
                    _ => return Err(spi::ErrorKind::Other),
                }
            }
            Ok(())
        }
    }

    impl PinErrorType for DcPin<'_> {
        type Error = digital::ErrorKind;
    }

    impl OutputPin for DcPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            *self.level.borrow_mut() = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            *self.level.borrow_mut() = true;
            Ok(())
        }
    }

    #[test]
    fn test_dc_pin_selects_command_or_data() {
        let wire = Wire::default();
        let level = RefCell::new(true);
        let mut iface = SpiInterface::new(
            Device { wire: &wire, dc: &level },
            DcPin { level: &level },
        );

        iface.send_commands(&[0x22, 0, 0]).unwrap();
        iface.send_data(&[0xAA]).unwrap();
        iface.send_command(0xAF).unwrap();

        assert_eq!(
            *wire.borrow(),
            vec![(false, vec![0x22, 0, 0]), (true, vec![0xAA]), (false, vec![0xAF])]
        );
    }
}
