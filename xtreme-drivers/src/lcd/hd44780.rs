//! HD44780 character LCD behind a PCF8574 I2C expander
//!
//! The expander's eight outputs drive the LCD in 4-bit mode:
//!
//! ```text
//!  bit   7    6    5    4    3    2    1    0
//!       D7   D6   D5   D4   BL   EN   RW   RS
//! ```
//!
//! Every nibble goes out as three expander writes (EN low, high, low), high
//! nibble first. A whole row is sent as one I2C write: the DDRAM address
//! command followed by 16 characters.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;
use xtreme_display::{DisplayError, DisplaySink, LINE_WIDTH, SINK_ROWS};

/// Usual address of a PCF8574 LCD backpack
pub const PCF8574_ADDRESS: u8 = 0x27;

const PIN_RS: u8 = 1 << 0;
const PIN_EN: u8 = 1 << 2;
const PIN_BL: u8 = 1 << 3;

/// LCD commands
mod cmd {
    /// Switch the controller to 4-bit transfers
    pub const FOUR_BIT_MODE: u8 = 0x02;
    /// 4-bit, 2 lines, 5x8 font
    pub const FUNCTION_SET: u8 = 0x28;
    /// Display on, cursor off
    pub const DISPLAY_ON: u8 = 0x0c;
    /// Display off
    pub const DISPLAY_OFF: u8 = 0x08;
    /// Increment address after each character
    pub const ENTRY_INCREMENT: u8 = 0x06;
    pub const CLEAR: u8 = 0x01;
}

/// DDRAM address command of each sink row
const ROW_ADDRESS: [u8; SINK_ROWS] = [0x80, 0xc0];

/// Expander writes per LCD byte (two nibbles, three writes each)
const WRITES_PER_BYTE: usize = 6;

/// Longest burst: address command plus one full row
const BURST_LEN: usize = (1 + LINE_WIDTH) * WRITES_PER_BYTE;

/// Time the controller needs after a clear
const CLEAR_DELAY_MS: u32 = 5;

type Burst = Vec<u8, BURST_LEN>;

/// HD44780 display sink
pub struct Hd44780<I> {
    i2c: I,
    address: u8,
    backlight: bool,
    initialized: bool,
}

impl<I: I2c> Hd44780<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            backlight: false,
            initialized: false,
        }
    }

    /// Put the controller into 4-bit mode, clear it and light the backlight
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        let mut burst = Burst::new();
        push_byte(&mut burst, cmd::FOUR_BIT_MODE, 0);
        push_byte(&mut burst, cmd::FUNCTION_SET, 0);
        push_byte(&mut burst, cmd::DISPLAY_ON, PIN_BL);
        push_byte(&mut burst, cmd::ENTRY_INCREMENT, PIN_BL);
        push_byte(&mut burst, cmd::CLEAR, PIN_BL);
        self.send(&burst)?;

        delay.delay_ms(CLEAR_DELAY_MS);
        self.backlight = true;
        self.initialized = true;
        Ok(())
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    /// Give the bus back
    pub fn release(self) -> I {
        self.i2c
    }

    fn signals(&self) -> u8 {
        if self.backlight {
            PIN_BL
        } else {
            0
        }
    }

    fn send(&mut self, burst: &[u8]) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, burst)
            .map_err(|_| DisplayError::Communication)
    }
}

impl<I: I2c> DisplaySink for Hd44780<I> {
    fn write_row(&mut self, row: u8, text: &[u8]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        let address = *ROW_ADDRESS
            .get(usize::from(row))
            .ok_or(DisplayError::InvalidRow)?;

        let signals = self.signals();
        let mut burst = Burst::new();
        push_byte(&mut burst, address, signals);
        for col in 0..LINE_WIDTH {
            let ch = text.get(col).copied().unwrap_or(b' ');
            push_byte(&mut burst, ch, signals | PIN_RS);
        }
        self.send(&burst)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        let command = if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF };
        let signals = if on { PIN_BL } else { 0 };

        let mut burst = Burst::new();
        push_byte(&mut burst, command, signals);
        self.send(&burst)?;
        self.backlight = on;
        Ok(())
    }
}

fn push_nibble(burst: &mut Burst, pins: u8) {
    // BURST_LEN covers the longest burst built here
    let _ = burst.extend_from_slice(&[pins, pins | PIN_EN, pins]);
}

fn push_byte(burst: &mut Burst, byte: u8, signals: u8) {
    push_nibble(burst, (byte & 0xf0) | signals);
    push_nibble(burst, (byte << 4) | signals);
}
