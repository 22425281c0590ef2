//! Control+Alternate shortcuts
//!
//! Only evaluated while no configuration session is running. The keyboard
//! driver forwards key codes outside a session only with Control+Alternate
//! held, so any non-zero key reaching [`hotkey`] there is a shortcut
//! candidate.
//!
//! Shortcuts change the live outputs only. The stored record keeps its
//! values, so the next power-up starts from the saved settings again.

use core::fmt::Write;

use heapless::String;

use crate::config::{BootSource, ConfigRecord, SoundMode, TITLE_LEN};

/// Scan code of F1; F2-F4 follow
const KEY_F1: u8 = 59;
const KEY_F4: u8 = 62;
const KEY_B: u8 = 48;
const KEY_S: u8 = 31;
const KEY_DELETE: u8 = 83;

/// Shortcut recognised from a key code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HotkeyAction {
    /// Switch to ROM bank 1-4 and reset the machine
    SelectRomBank(u8),
    /// Swap internal/external boot drive and reset the machine
    ToggleBoot,
    /// Swap mono/stereo sound
    ToggleSound,
    /// Pulse the reset line
    Reset,
}

impl HotkeyAction {
    /// Whether the host must be reset for the action to take effect
    pub fn needs_reset(self) -> bool {
        !matches!(self, HotkeyAction::ToggleSound)
    }
}

/// Output levels currently driven on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LiveOutputs {
    pub rom_bank: u8,
    pub sound: SoundMode,
    pub boot: BootSource,
}

/// Two-line message describing what a shortcut did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub line1: String<TITLE_LEN>,
    pub line2: String<TITLE_LEN>,
    /// The host must be pulsed through reset
    pub reset: bool,
}

impl Notice {
    fn new(line1: &str, line2: &str, reset: bool) -> Self {
        let mut notice = Self {
            line1: String::new(),
            line2: String::new(),
            reset,
        };
        // Longer text is cut at the line width
        for (line, text) in [(&mut notice.line1, line1), (&mut notice.line2, line2)] {
            for ch in text.chars() {
                if line.push(ch).is_err() {
                    break;
                }
            }
        }
        notice
    }
}

impl LiveOutputs {
    pub fn from_record(record: &ConfigRecord) -> Self {
        Self {
            rom_bank: record.rom_bank,
            sound: record.sound,
            boot: record.boot,
        }
    }

    /// Apply a shortcut and describe the result
    ///
    /// `record` supplies the ROM titles for the notice.
    pub fn apply(&mut self, action: HotkeyAction, record: &ConfigRecord) -> Notice {
        match action {
            HotkeyAction::SelectRomBank(bank) => {
                self.rom_bank = bank;
                let mut heading: String<TITLE_LEN> = String::new();
                let _ = write!(heading, "Current ROM {}:", bank);
                Notice::new(&heading, record.title(bank).unwrap_or_default(), true)
            }
            HotkeyAction::ToggleBoot => {
                self.boot = self.boot.toggled();
                let drive = match self.boot {
                    BootSource::Internal => "  internal drive",
                    BootSource::External => "  external drive",
                };
                Notice::new("> Boot from", drive, true)
            }
            HotkeyAction::ToggleSound => {
                self.sound = self.sound.toggled();
                let text = match self.sound {
                    SoundMode::Stereo => "> Stereo sound!",
                    SoundMode::Mono => "> Mono sound",
                };
                Notice::new(text, "", false)
            }
            HotkeyAction::Reset => Notice::new("-- RESET --", "", true),
        }
    }
}

/// Map a key code to its shortcut
pub fn hotkey(key: u8) -> Option<HotkeyAction> {
    match key {
        KEY_F1..=KEY_F4 => Some(HotkeyAction::SelectRomBank(key - KEY_F1 + 1)),
        KEY_B => Some(HotkeyAction::ToggleBoot),
        KEY_S => Some(HotkeyAction::ToggleSound),
        KEY_DELETE => Some(HotkeyAction::Reset),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_keys_select_banks() {
        assert_eq!(hotkey(59), Some(HotkeyAction::SelectRomBank(1)));
        assert_eq!(hotkey(62), Some(HotkeyAction::SelectRomBank(4)));
        assert_eq!(hotkey(63), None);
    }

    #[test]
    fn test_letter_shortcuts() {
        assert_eq!(hotkey(48), Some(HotkeyAction::ToggleBoot));
        assert_eq!(hotkey(31), Some(HotkeyAction::ToggleSound));
        assert_eq!(hotkey(83), Some(HotkeyAction::Reset));
        assert_eq!(hotkey(0), None);
        assert!(!HotkeyAction::ToggleSound.needs_reset());
        assert!(HotkeyAction::ToggleBoot.needs_reset());
    }

    #[test]
    fn test_select_rom_notice() {
        let mut record = ConfigRecord::factory();
        record.titles[2] = String::try_from("TOS 2.06 DE").unwrap();
        let mut live = LiveOutputs::from_record(&record);

        let notice = live.apply(HotkeyAction::SelectRomBank(3), &record);
        assert_eq!(live.rom_bank, 3);
        assert_eq!(notice.line1, "Current ROM 3:");
        assert_eq!(notice.line2, "TOS 2.06 DE");
        assert!(notice.reset);
        // Stored settings are untouched
        assert_eq!(record.rom_bank, 1);
    }

    #[test]
    fn test_toggle_notices() {
        let record = ConfigRecord::factory();
        let mut live = LiveOutputs::from_record(&record);

        let notice = live.apply(HotkeyAction::ToggleSound, &record);
        assert_eq!(live.sound, SoundMode::Mono);
        assert_eq!(notice.line1, "> Mono sound");
        assert!(!notice.reset);

        let notice = live.apply(HotkeyAction::ToggleBoot, &record);
        assert_eq!(live.boot, BootSource::External);
        assert_eq!(notice.line2, "  external drive");
        assert!(notice.reset);

        let before = live;
        let notice = live.apply(HotkeyAction::Reset, &record);
        assert_eq!(live, before);
        assert_eq!(notice.line1, "-- RESET --");
        assert_eq!(notice.line2, "");
    }

    #[test]
    fn test_reset_flag_matches_action() {
        let record = ConfigRecord::factory();
        let mut live = LiveOutputs::from_record(&record);
        for key in [59, 60, 61, 62, 48, 31, 83] {
            let action = hotkey(key).unwrap();
            assert_eq!(live.apply(action, &record).reset, action.needs_reset());
        }
    }
}
