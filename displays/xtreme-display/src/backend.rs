//! Display sink trait
//!
//! Defines the interface for the physical character display.

/// Display sink errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Row outside the display
    InvalidRow,
    /// Display not initialized
    NotInitialized,
}

/// Physical character display
///
/// The compositor only calls into the sink when something changed, so
/// implementations can write straight to the hardware.
pub trait DisplaySink {
    /// Replace the text of one row
    ///
    /// - `row`: Row number (0-based)
    /// - `text`: Exactly one row of characters, already padded
    fn write_row(&mut self, row: u8, text: &[u8]) -> Result<(), DisplayError>;

    /// Switch the backlight
    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError>;
}

impl<T: DisplaySink + ?Sized> DisplaySink for &mut T {
    fn write_row(&mut self, row: u8, text: &[u8]) -> Result<(), DisplayError> {
        (**self).write_row(row, text)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        (**self).set_backlight(on)
    }
}
