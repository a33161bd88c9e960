//! Panel configuration
//!
//! Describes which module is attached: geometry, power source, initial
//! rotation and I2C address. Can be built in code or, with the `std`
//! feature, loaded from a TOML file:
//!
//! ```toml
//! width = 128
//! height = 32
//! external_vcc = false
//! rotation = 2
//! i2c_address = 0x3C
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::display::ssd1306::{self, MAX_HEIGHT, MAX_WIDTH};
use crate::hal::i2c::DEFAULT_ADDRESS;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported panel size {width}x{height} (max {max_width}x{max_height})")]
    UnsupportedSize {
        width: u16,
        height: u16,
        max_width: u16,
        max_height: u16,
    },

    #[error("I2C address {0:#04x} is not a 7-bit address")]
    InvalidAddress(u8),

    #[cfg(feature = "std")]
    #[error("failed to read panel config: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "std")]
    #[error("failed to parse panel config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Attached panel description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Panel width in pixels
    pub width: u16,
    /// Panel height in pixels
    pub height: u16,
    /// VCC supplied externally (charge pump off)
    pub external_vcc: bool,
    /// Initial rotation in quarter turns
    pub rotation: u8,
    /// 7-bit I2C address, ignored for SPI
    pub i2c_address: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
            external_vcc: false,
            rotation: 0,
            i2c_address: DEFAULT_ADDRESS,
        }
    }
}

impl DisplayConfig {
    /// Create a configuration for a `width` x `height` panel
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the power source
    pub fn with_external_vcc(mut self, external_vcc: bool) -> Self {
        self.external_vcc = external_vcc;
        self
    }

    /// Set the initial rotation (quarter turns, reduced modulo 4)
    pub fn with_rotation(mut self, quarter_turns: u8) -> Self {
        self.rotation = quarter_turns % 4;
        self
    }

    /// Set the I2C address
    pub fn with_i2c_address(mut self, address: u8) -> Self {
        self.i2c_address = address;
        self
    }

    /// Check the configuration against controller limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !ssd1306::is_supported_size(self.width, self.height) {
            return Err(ConfigError::UnsupportedSize {
                width: self.width,
                height: self.height,
                max_width: MAX_WIDTH,
                max_height: MAX_HEIGHT,
            });
        }
        if self.i2c_address > 0x7F {
            return Err(ConfigError::InvalidAddress(self.i2c_address));
        }
        Ok(())
    }

    /// Parse and validate TOML
    #[cfg(feature = "std")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    #[cfg(feature = "std")]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML
    #[cfg(feature = "std")]
    pub fn to_toml_string(&self) -> String {
        // Plain struct of integers and bools, serialization cannot fail
        toml::to_string(self).unwrap_or_default()
    }
}
