//! Keyboard serial link
//!
//! The ST keyboard processor talks 7812.5 baud 8N1. Bytes land in the
//! buffered USART's ring under interrupt and are picked up by the main loop.

use embassy_stm32::usart::{BufferedUartRx, Error as UsartError};
use embedded_io::{Read, ReadReady};

use xtreme_hal::uart::SerialRx;

/// Keyboard line rate (the ACIA runs 500 kHz / 64)
pub const KEYBOARD_BAUD: u32 = 7812;

/// Error from the keyboard receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Framing error
    Framing,
    /// Noise error
    Noise,
    /// Overrun error
    Overrun,
    /// Parity error
    Parity,
    /// Other error
    Other,
}

impl From<UsartError> for SerialError {
    fn from(e: UsartError) -> Self {
        match e {
            UsartError::Framing => SerialError::Framing,
            UsartError::Noise => SerialError::Noise,
            UsartError::Overrun => SerialError::Overrun,
            UsartError::Parity => SerialError::Parity,
            _ => SerialError::Other,
        }
    }
}

/// Non-blocking receiver over a buffered USART
pub struct KeyboardRx<'d> {
    rx: BufferedUartRx<'d>,
}

impl<'d> KeyboardRx<'d> {
    pub fn new(rx: BufferedUartRx<'d>) -> Self {
        Self { rx }
    }
}

impl SerialRx for KeyboardRx<'_> {
    type Error = SerialError;

    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.rx.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        let n = self.rx.read(&mut byte)?;
        Ok((n == 1).then_some(byte[0]))
    }
}
