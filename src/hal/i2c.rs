//! I2C transport
//!
//! Every transfer starts with a control byte: Co=0 and D/C#=0 (`0x00`)
//! for a command stream, D/C#=1 (`0x40`) for a GDDRAM data stream.

use embedded_hal::i2c::{I2c, Operation};

use super::Interface;

/// Default 7-bit address (SA0 low)
pub const DEFAULT_ADDRESS: u8 = 0x3C;
/// Alternate 7-bit address (SA0 high)
pub const ALTERNATE_ADDRESS: u8 = 0x3D;

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// GDDRAM bytes per I2C transaction
pub const DATA_CHUNK: usize = 16;

/// SSD1306 over I2C
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cInterface<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus back
    pub fn into_inner(self) -> I2C {
        self.i2c
    }

    fn write_framed(&mut self, control: u8, bytes: &[u8]) -> Result<(), I2C::Error> {
        // Adjacent writes go out back to back without a repeated start
        self.i2c.transaction(
            self.address,
            &mut [Operation::Write(&[control]), Operation::Write(bytes)],
        )
    }
}

impl<I2C: I2c> Interface for I2cInterface<I2C> {
    type Error = I2C::Error;

    fn send_commands(&mut self, commands: &[u8]) -> Result<(), Self::Error> {
        self.write_framed(CONTROL_COMMAND, commands)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for chunk in data.chunks(DATA_CHUNK) {
            self.write_framed(CONTROL_DATA, chunk)?;
        }
        Ok(())
    }
}
