//! SSD1306 OLED Controller Command Set
//!
//! Command encoding for the Solomon Systech SSD1306 (and pin-compatible
//! SSD1309/SH1106 parts running in page addressing compatible mode).
//! Nothing in here touches the bus; it only produces byte sequences.

/// SSD1306 commands
pub mod cmd {
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const RIGHT_HORIZONTAL_SCROLL: u8 = 0x26;
    pub const LEFT_HORIZONTAL_SCROLL: u8 = 0x27;
    pub const VERTICAL_RIGHT_HORIZONTAL_SCROLL: u8 = 0x29;
    pub const VERTICAL_LEFT_HORIZONTAL_SCROLL: u8 = 0x2A;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
    pub const ACTIVATE_SCROLL: u8 = 0x2F;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const CHARGE_PUMP: u8 = 0x8D;
    pub const SEG_REMAP: u8 = 0xA0;
    pub const SET_VERTICAL_SCROLL_AREA: u8 = 0xA3;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const INVERT_DISPLAY: u8 = 0xA7;
    pub const SET_MULTIPLEX: u8 = 0xA8;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
}

/// Largest panel the controller can address
pub const MAX_WIDTH: u16 = 128;
pub const MAX_HEIGHT: u16 = 64;

/// Suggested oscillator ratio after reset
const CLOCK_DIV: u8 = 0x80;
/// Horizontal addressing mode
const MEMORY_MODE_HORIZONTAL: u8 = 0x00;
/// ~0.77 x VCC deselect level
const VCOM_DESELECT: u8 = 0x40;

const CHARGE_PUMP_DISABLE: u8 = 0x10;
const CHARGE_PUMP_ENABLE: u8 = 0x14;
const PRECHARGE_EXTERNAL: u8 = 0x22;
const PRECHARGE_INTERNAL: u8 = 0xF1;

/// Bytes in the startup command sequence
pub const INIT_SEQUENCE_LEN: usize = 25;

/// Whether the controller can drive a `width` x `height` panel
pub const fn is_supported_size(width: u16, height: u16) -> bool {
    width > 0 && height > 0 && width <= MAX_WIDTH && height <= MAX_HEIGHT
}

/// Per-panel register values
///
/// Derived once from the panel geometry and power source, never changed
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelConfig {
    pub width: u16,
    pub height: u16,
    pub external_vcc: bool,
    pub multiplex: u8,
    pub com_pins: u8,
    pub contrast: u8,
    pub charge_pump: u8,
    pub precharge: u8,
    pub display_offset: u8,
    pub start_line: u8,
}

impl PanelConfig {
    /// Look up tuning for a panel
    ///
    /// Only 128x32, 128x64 and 96x16 modules have dedicated values; any
    /// other size gets the 128x32 defaults.
    pub const fn new(width: u16, height: u16, external_vcc: bool) -> Self {
        let (com_pins, contrast) = match (width, height) {
            (128, 32) => (0x02, 0x8F),
            (128, 64) => (0x12, if external_vcc { 0x9F } else { 0xCF }),
            (96, 16) => (0x02, if external_vcc { 0x10 } else { 0xAF }),
            _ => (0x02, 0x8F),
        };

        Self {
            width,
            height,
            external_vcc,
            multiplex: height.saturating_sub(1) as u8,
            com_pins,
            contrast,
            charge_pump: if external_vcc { CHARGE_PUMP_DISABLE } else { CHARGE_PUMP_ENABLE },
            precharge: if external_vcc { PRECHARGE_EXTERNAL } else { PRECHARGE_INTERNAL },
            display_offset: 0,
            start_line: 0,
        }
    }

    /// Command bytes sent during startup, before the first flush
    pub const fn init_sequence(&self) -> [u8; INIT_SEQUENCE_LEN] {
        [
            cmd::DISPLAY_OFF,
            cmd::SET_DISPLAY_CLOCK_DIV,
            CLOCK_DIV,
            cmd::SET_MULTIPLEX,
            self.multiplex,
            cmd::SET_MEMORY_MODE,
            MEMORY_MODE_HORIZONTAL,
            cmd::SEG_REMAP | 0x01,
            cmd::COM_SCAN_DEC,
            cmd::SET_VCOM_DETECT,
            VCOM_DESELECT,
            cmd::CHARGE_PUMP,
            self.charge_pump,
            cmd::SET_DISPLAY_OFFSET,
            self.display_offset,
            cmd::SET_START_LINE | self.start_line,
            cmd::SET_COM_PINS,
            self.com_pins,
            cmd::SET_CONTRAST,
            self.contrast,
            cmd::SET_PRECHARGE,
            self.precharge,
            cmd::DISPLAY_ALL_ON_RESUME,
            cmd::NORMAL_DISPLAY,
            cmd::DEACTIVATE_SCROLL,
        ]
    }
}

/// Page and column window for a single-page data transfer
pub const fn page_window(page: u8, x1: u8, x2: u8) -> [u8; 6] {
    [cmd::SET_PAGE_ADDR, page, page, cmd::SET_COLUMN_ADDR, x1, x2]
}

/// Contrast command; `0x00` dims the panel
pub const fn contrast(value: u8) -> [u8; 2] {
    [cmd::SET_CONTRAST, value]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_128x64_internal_vcc() {
        let panel = PanelConfig::new(128, 64, false);
        assert_eq!(panel.contrast, 0xCF);
        assert_eq!(panel.charge_pump, 0x14);
        assert_eq!(panel.com_pins, 0x12);
        assert_eq!(panel.multiplex, 63);
        assert_eq!(panel.precharge, 0xF1);
    }

    #[test]
    fn test_128x64_external_vcc() {
        let panel = PanelConfig::new(128, 64, true);
        assert_eq!(panel.contrast, 0x9F);
        assert_eq!(panel.charge_pump, 0x10);
        assert_eq!(panel.precharge, 0x22);
    }

    #[test]
    fn test_panel_table() {
        assert_eq!(PanelConfig::new(128, 32, false).contrast, 0x8F);
        assert_eq!(PanelConfig::new(96, 16, false).contrast, 0xAF);
        assert_eq!(PanelConfig::new(96, 16, true).contrast, 0x10);

        let fallback = PanelConfig::new(64, 48, false);
        assert_eq!(fallback.contrast, 0x8F);
        assert_eq!(fallback.com_pins, 0x02);
        assert_eq!(fallback.multiplex, 47);
    }

    #[test]
    fn test_init_sequence_order() {
        let seq = PanelConfig::new(128, 32, false).init_sequence();
        assert_eq!(
            seq,
            [
                0xAE, 0xD5, 0x80, 0xA8, 0x1F, 0x20, 0x00, 0xA1, 0xC8, 0xDB, 0x40, 0x8D, 0x14,
                0xD3, 0x00, 0x40, 0xDA, 0x02, 0x81, 0x8F, 0xD9, 0xF1, 0xA4, 0xA6, 0x2E,
            ]
        );
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(3, 10, 20), [0x22, 3, 3, 0x21, 10, 20]);
    }

    #[test]
    fn test_supported_sizes() {
        assert!(is_supported_size(128, 64));
        assert!(is_supported_size(72, 40));
        assert!(!is_supported_size(0, 64));
        assert!(!is_supported_size(132, 64));
        assert!(!is_supported_size(128, 65));
    }
}
