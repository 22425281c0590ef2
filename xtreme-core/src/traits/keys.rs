//! Keyboard abstraction

use crate::input::Buttons;

/// One sample of keyboard state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeySample {
    /// Key code pressed since the last poll, 0 if none
    pub key: u8,
    /// Current menu button levels
    pub buttons: Buttons,
    /// Current button mask reported to the OSD host
    pub host_buttons: u8,
}

/// Source of keyboard samples
pub trait KeySource {
    type Error;

    /// Consume pending input and return the current state
    ///
    /// `session_active` lets the source forward keys and arrow buttons
    /// without the Control+Alternate chord.
    fn poll(&mut self, session_active: bool) -> Result<KeySample, Self::Error>;
}

/// Translation of key codes to characters
pub trait KeyMap {
    /// Printable ASCII (or 0x08 for backspace) for `key`, 0 if unmapped
    fn to_char(&self, key: u8) -> u8;
}
