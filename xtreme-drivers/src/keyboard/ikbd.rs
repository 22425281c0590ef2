//! Atari ST keyboard scan-code decoder
//!
//! The keyboard processor sends one byte per key event: the scan code on
//! press, the scan code with bit 7 set on release. The decoder tracks the
//! modifier keys and the four keys that double as menu buttons.
//!
//! Keys belong to the host unless the menu is open or Control+Alternate
//! are held. Only then are key presses forwarded and the arrow keys latched
//! as buttons. Releases always clear a latched button so none can stick;
//! modifiers and releases are never forwarded.

use xtreme_core::input::Buttons;
use xtreme_core::traits::{KeyMap, KeySample, KeySource};
use xtreme_hal::uart::SerialRx;

use super::keymap::keyscan_to_ascii;

/// Scan codes the decoder reacts to
mod scan {
    pub const SHIFT: u8 = 0x2a;
    pub const CONTROL: u8 = 0x1d;
    pub const ALTERNATE: u8 = 0x38;
    pub const LEFT: u8 = 0x4b;
    pub const RIGHT: u8 = 0x4d;
    pub const UP: u8 = 0x48;
    pub const HELP: u8 = 0x62;

    /// Set on key release
    pub const RELEASE: u8 = 0x80;
}

/// Latched key state bits
mod held {
    pub const SHIFT: u8 = 1 << 0;
    pub const CONTROL: u8 = 1 << 1;
    pub const ALTERNATE: u8 = 1 << 2;
    pub const HELP: u8 = 1 << 3;
    pub const LEFT: u8 = 1 << 4;
    pub const RIGHT: u8 = 1 << 5;
    pub const SELECT: u8 = 1 << 6;

    pub const CHORD: u8 = CONTROL | ALTERNATE;
}

/// Host button bits reported over the OSD status block
const HOST_LEFT: u8 = 1 << 0;
const HOST_RIGHT: u8 = 1 << 1;
const HOST_HELP: u8 = 1 << 2;

/// Keyboard decoder over a serial receiver
pub struct StKeyboard<R> {
    rx: R,
    held: u8,
}

impl<R: SerialRx> StKeyboard<R> {
    pub fn new(rx: R) -> Self {
        Self { rx, held: 0 }
    }

    /// Whether Control and Alternate are both held
    pub fn chord_held(&self) -> bool {
        self.held & held::CHORD == held::CHORD
    }

    pub fn shift_held(&self) -> bool {
        self.held & held::SHIFT != 0
    }

    /// Update state for one received byte; returns the code if forwarded
    fn decode(&mut self, code: u8, session_active: bool) -> Option<u8> {
        match code {
            scan::SHIFT => self.held |= held::SHIFT,
            scan::CONTROL => self.held |= held::CONTROL,
            scan::ALTERNATE => self.held |= held::ALTERNATE,
            c if c == scan::SHIFT | scan::RELEASE => self.held &= !held::SHIFT,
            c if c == scan::CONTROL | scan::RELEASE => self.held &= !held::CONTROL,
            c if c == scan::ALTERNATE | scan::RELEASE => self.held &= !held::ALTERNATE,
            c if c == scan::LEFT | scan::RELEASE => self.held &= !held::LEFT,
            c if c == scan::RIGHT | scan::RELEASE => self.held &= !held::RIGHT,
            c if c == scan::UP | scan::RELEASE => self.held &= !held::SELECT,
            c if c == scan::HELP | scan::RELEASE => self.held &= !held::HELP,
            _ => {}
        }

        let modifier = matches!(code, scan::SHIFT | scan::CONTROL | scan::ALTERNATE);
        if code & scan::RELEASE != 0 || modifier {
            return None;
        }
        if !(session_active || self.chord_held()) {
            return None;
        }

        match code {
            scan::LEFT => self.held |= held::LEFT,
            scan::RIGHT => self.held |= held::RIGHT,
            scan::UP => self.held |= held::SELECT,
            scan::HELP => self.held |= held::HELP,
            _ => {}
        }
        Some(code)
    }

    fn buttons(&self) -> Buttons {
        let mut buttons = Buttons::NONE;
        buttons.set(Buttons::LEFT, self.held & held::LEFT != 0);
        buttons.set(Buttons::RIGHT, self.held & held::RIGHT != 0);
        buttons.set(Buttons::CONFIRM, self.held & held::SELECT != 0);
        buttons
    }

    fn host_buttons(&self) -> u8 {
        [
            (held::LEFT, HOST_LEFT),
            (held::RIGHT, HOST_RIGHT),
            (held::HELP, HOST_HELP),
        ]
        .iter()
        .filter(|(bit, _)| self.held & bit != 0)
        .fold(0, |mask, (_, host)| mask | host)
    }
}

impl<R: SerialRx> KeySource for StKeyboard<R> {
    type Error = R::Error;

    /// Decode pending bytes up to and including the next forwarded key
    ///
    /// Bytes after a forwarded key stay queued for the next poll so that no
    /// key press is lost when several arrive within one tick.
    fn poll(&mut self, session_active: bool) -> Result<KeySample, Self::Error> {
        let mut key = 0;
        while let Some(code) = self.rx.try_read_byte()? {
            if let Some(forwarded) = self.decode(code, session_active) {
                key = forwarded;
                break;
            }
        }

        Ok(KeySample {
            key,
            buttons: self.buttons(),
            host_buttons: self.host_buttons(),
        })
    }
}

impl<R> KeyMap for StKeyboard<R> {
    fn to_char(&self, key: u8) -> u8 {
        keyscan_to_ascii(key, self.held & held::SHIFT != 0)
    }
}
