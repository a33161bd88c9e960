//! Transport Abstraction Layer
//!
//! The display core only needs three things from the bus: send a command
//! sequence, send a data block, and let go of the bus. Adapters are
//! provided for:
//! - I2C (`embedded_hal::i2c::I2c`, control-byte framing)
//! - 4-wire SPI (`embedded_hal::spi::SpiDevice` + D/C pin)
//! - an in-memory recorder for tests and tooling

pub mod i2c;
pub mod recording;
pub mod reset;
pub mod spi;

pub use i2c::I2cInterface;
pub use recording::{InjectedFailure, InstantDelay, RecordingInterface, Transaction};
pub use reset::{NoReset, ResetControl, ResetError, ResetPin};
pub use spi::{SpiInterface, SpiInterfaceError};

/// Command/data channel to the controller
pub trait Interface {
    type Error: core::fmt::Debug;

    /// Send a sequence of command bytes
    fn send_commands(&mut self, commands: &[u8]) -> Result<(), Self::Error>;

    /// Send a single command byte
    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.send_commands(&[command])
    }

    /// Send a block of GDDRAM data
    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Release bus resources after shutdown
    fn release(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: Interface + ?Sized> Interface for &mut T {
    type Error = T::Error;

    fn send_commands(&mut self, commands: &[u8]) -> Result<(), Self::Error> {
        (**self).send_commands(commands)
    }

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        (**self).send_command(command)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).send_data(data)
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        (**self).release()
    }
}
