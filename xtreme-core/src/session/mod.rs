//! Configuration menu
//!
//! [`ConfigSession`] edits a [`ConfigRecord`] in place, driven by accepted
//! button presses and decoded key characters. While it is not idle it owns
//! a 16x2 frame that pre-empts every other display producer.
//!
//! Leaving the menu applies exactly one [`ExitAction`]. Actions that need a
//! restart return [`SessionStep::HaltForRestart`]; the caller is expected to
//! stop feeding the watchdog.

pub mod state;

pub use state::{ExitAction, MenuState};

use core::fmt::Write;

use heapless::String;
use xtreme_display::DisplayFrame;
use xtreme_hal::flash::PageFlash;

use crate::config::{is_title_char, ConfigRecord, ConfigStore, StoreError, TITLE_LEN};
use crate::input::Buttons;

const BACKSPACE: u8 = 0x08;

/// Input for one session tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionInput {
    /// Debounced button presses
    pub buttons: Buttons,
    /// Decoded key character, 0 if none
    pub ch: u8,
}

/// Result of one session tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionStep {
    /// Menu closed, nothing happened
    Idle,
    /// Menu just opened
    Started,
    /// Menu open
    Active,
    /// Menu closed; the record should be applied to the outputs again
    Finished(ExitAction),
    /// Settings persisted; the controller must restart
    HaltForRestart,
}

/// Configuration menu state machine
#[derive(Debug, Clone)]
pub struct ConfigSession {
    state: MenuState,
    snapshot: ConfigRecord,
    frame: DisplayFrame,
}

impl Default for ConfigSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSession {
    pub fn new() -> Self {
        Self {
            state: MenuState::Idle,
            snapshot: ConfigRecord::factory(),
            frame: DisplayFrame::new(16, 2),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.state.is_idle()
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Menu frame, only while the menu is open
    pub fn frame(&self) -> Option<&DisplayFrame> {
        self.is_active().then_some(&self.frame)
    }

    /// Process one tick of input
    ///
    /// A confirm press advances the menu; characters typed on that same tick
    /// are ignored. Store errors are returned after the menu has closed.
    pub fn handle<F: PageFlash>(
        &mut self,
        input: SessionInput,
        record: &mut ConfigRecord,
        store: &mut ConfigStore<F>,
    ) -> Result<SessionStep, StoreError> {
        if input.buttons.contains(Buttons::CONFIRM) {
            return self.confirm(record, store);
        }
        if self.state.is_idle() {
            return Ok(SessionStep::Idle);
        }
        self.edit(input, record);
        Ok(SessionStep::Active)
    }

    fn confirm<F: PageFlash>(
        &mut self,
        record: &mut ConfigRecord,
        store: &mut ConfigStore<F>,
    ) -> Result<SessionStep, StoreError> {
        let previous = self.state;
        self.state = previous.advance();

        if let MenuState::SaveConfirm(action) = previous {
            return self.apply(action, record, store);
        }

        let step = if previous.is_idle() {
            self.snapshot = record.clone();
            self.frame.clear();
            self.frame.set_backlight(true);
            SessionStep::Started
        } else {
            SessionStep::Active
        };
        self.render_heading();
        self.render_value(record);
        Ok(step)
    }

    fn apply<F: PageFlash>(
        &mut self,
        action: ExitAction,
        record: &mut ConfigRecord,
        store: &mut ConfigStore<F>,
    ) -> Result<SessionStep, StoreError> {
        match action {
            ExitAction::Save => store.save(record)?,
            ExitAction::SaveAndRestart => {
                store.save(record)?;
                return Ok(SessionStep::HaltForRestart);
            }
            ExitAction::Keep => {}
            ExitAction::Discard => *record = self.snapshot.clone(),
            ExitAction::FactoryReset => {
                *record = store.restore_defaults()?;
                return Ok(SessionStep::HaltForRestart);
            }
        }
        Ok(SessionStep::Finished(action))
    }

    fn edit(&mut self, input: SessionInput, record: &mut ConfigRecord) {
        let left = input.buttons.contains(Buttons::LEFT);
        let right = input.buttons.contains(Buttons::RIGHT);

        let changed = match self.state {
            MenuState::Idle | MenuState::Banner => false,
            MenuState::Title(bank) => edit_title(record, bank, input.ch),
            MenuState::RomBank => {
                if left {
                    record.previous_bank();
                }
                if right {
                    record.next_bank();
                }
                left || right
            }
            MenuState::Sound => {
                if left || right {
                    record.sound = record.sound.toggled();
                }
                left || right
            }
            MenuState::Boot => {
                if left || right {
                    record.boot = record.boot.toggled();
                }
                left || right
            }
            MenuState::SaveConfirm(mut action) => {
                if left {
                    action = action.previous();
                }
                if right {
                    action = action.next();
                }
                self.state = MenuState::SaveConfirm(action);
                left || right
            }
        };

        if changed {
            self.render_value(record);
        }
    }

    fn render_heading(&mut self) {
        let mut line: String<TITLE_LEN> = String::new();
        // Every heading fits the line; overflow only truncates
        let _ = match self.state {
            MenuState::Idle => Ok(()),
            MenuState::Banner => line.write_str("Atari STe Xtreme"),
            MenuState::Title(bank) => write!(line, "ROM {} name:", bank),
            MenuState::RomBank => line.write_str("TOS rom (1-4):"),
            MenuState::Sound => line.write_str("Sound:"),
            MenuState::Boot => line.write_str("Boot:"),
            MenuState::SaveConfirm(_) => line.write_str("Save new Config?"),
        };
        self.frame.set_line(0, line.as_bytes());
    }

    fn render_value(&mut self, record: &ConfigRecord) {
        let mut line: String<TITLE_LEN> = String::new();
        let _ = match self.state {
            MenuState::Idle => Ok(()),
            MenuState::Banner => line.write_str("Configuration"),
            MenuState::Title(bank) => line.write_str(record.title(bank).unwrap_or_default()),
            MenuState::RomBank => write!(line, "{}", record.rom_bank),
            MenuState::Sound => line.write_str(record.sound.label()),
            MenuState::Boot => line.write_str(record.boot.label()),
            MenuState::SaveConfirm(action) => line.write_str(action.label()),
        };
        self.frame.set_line(1, line.as_bytes());
    }
}

/// Apply a typed character to a title; true if the title changed
fn edit_title(record: &mut ConfigRecord, bank: u8, ch: u8) -> bool {
    let Some(title) = usize::from(bank)
        .checked_sub(1)
        .and_then(|slot| record.titles.get_mut(slot))
    else {
        return false;
    };

    match ch {
        BACKSPACE => title.pop().is_some(),
        ch if is_title_char(ch) => title.push(char::from(ch)).is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::testing::RamFlash;
    use crate::config::{BootSource, LoadOutcome, SoundMode, UNKNOWN_TITLE};
    use proptest::prelude::*;

    fn confirm() -> SessionInput {
        SessionInput {
            buttons: Buttons::CONFIRM,
            ch: 0,
        }
    }

    fn press(buttons: Buttons) -> SessionInput {
        SessionInput { buttons, ch: 0 }
    }

    fn key(ch: u8) -> SessionInput {
        SessionInput {
            buttons: Buttons::NONE,
            ch,
        }
    }

    struct Rig {
        session: ConfigSession,
        record: ConfigRecord,
        store: ConfigStore<RamFlash>,
    }

    impl Rig {
        fn new() -> Self {
            let mut store = ConfigStore::new(RamFlash::new(), ConfigRecord::factory()).unwrap();
            let record = store.load(false).record;
            Self {
                session: ConfigSession::new(),
                record,
                store,
            }
        }

        fn step(&mut self, input: SessionInput) -> SessionStep {
            self.session
                .handle(input, &mut self.record, &mut self.store)
                .unwrap()
        }

        fn confirms(&mut self, count: usize) -> SessionStep {
            let mut last = SessionStep::Idle;
            for _ in 0..count {
                last = self.step(confirm());
            }
            last
        }

        fn line(&self, row: usize) -> &[u8] {
            &self.session.frame().unwrap().row(row).unwrap()[..16]
        }
    }

    fn padded(text: &str) -> [u8; 16] {
        let mut out = [b' '; 16];
        out[..text.len()].copy_from_slice(text.as_bytes());
        out
    }

    #[test]
    fn test_idle_ignores_everything_but_confirm() {
        let mut rig = Rig::new();
        assert_eq!(rig.step(press(Buttons::LEFT | Buttons::RIGHT)), SessionStep::Idle);
        assert_eq!(rig.step(key(b'x')), SessionStep::Idle);
        assert!(rig.session.frame().is_none());
        assert_eq!(rig.record, ConfigRecord::factory());
    }

    #[test]
    fn test_banner_on_entry() {
        let mut rig = Rig::new();
        assert_eq!(rig.step(confirm()), SessionStep::Started);
        assert!(rig.session.is_active());
        assert_eq!(rig.line(0), &padded("Atari STe Xtreme"));
        assert_eq!(rig.line(1), &padded("Configuration"));
        assert!(rig.session.frame().unwrap().backlight());
    }

    #[test]
    fn test_title_rendered_on_entry() {
        let mut rig = Rig::new();
        rig.confirms(3);
        assert_eq!(rig.session.state(), MenuState::Title(2));
        assert_eq!(rig.line(0), &padded("ROM 2 name:"));
        assert_eq!(rig.line(1), &padded(UNKNOWN_TITLE));
    }

    #[test]
    fn test_title_edit_limits() {
        let mut rig = Rig::new();
        rig.confirms(2);
        for _ in 0..20 {
            rig.step(key(BACKSPACE));
        }
        assert_eq!(rig.record.titles[0], "");
        for ch in b"0123456789abcdefXYZ" {
            rig.step(key(*ch));
        }
        assert_eq!(rig.record.titles[0], "0123456789abcdef");
        // Control characters are not title material
        rig.step(key(0x1b));
        rig.step(key(BACKSPACE));
        assert_eq!(rig.record.titles[0], "0123456789abcde");
        assert_eq!(rig.line(1), &padded("0123456789abcde"));
    }

    #[test]
    fn test_rom_bank_clamps() {
        let mut rig = Rig::new();
        rig.confirms(6);
        assert_eq!(rig.session.state(), MenuState::RomBank);
        assert_eq!(rig.line(1), &padded("1"));
        rig.step(press(Buttons::LEFT));
        assert_eq!(rig.record.rom_bank, 1);
        for _ in 0..5 {
            rig.step(press(Buttons::RIGHT));
        }
        assert_eq!(rig.record.rom_bank, 4);
        assert_eq!(rig.line(1), &padded("4"));
    }

    #[test]
    fn test_sound_and_boot_toggle() {
        let mut rig = Rig::new();
        rig.confirms(7);
        assert_eq!(rig.line(0), &padded("Sound:"));
        rig.step(press(Buttons::RIGHT));
        assert_eq!(rig.record.sound, SoundMode::Mono);
        assert_eq!(rig.line(1), &padded("Mono"));
        rig.step(confirm());
        assert_eq!(rig.line(1), &padded("Intern"));
        rig.step(press(Buttons::LEFT));
        assert_eq!(rig.record.boot, BootSource::External);
        assert_eq!(rig.line(1), &padded("Extern"));
    }

    #[test]
    fn test_save_confirm_defaults_to_save_and_restart() {
        let mut rig = Rig::new();
        rig.confirms(9);
        assert_eq!(
            rig.session.state(),
            MenuState::SaveConfirm(ExitAction::SaveAndRestart)
        );
        assert_eq!(rig.line(0), &padded("Save new Config?"));
        assert_eq!(rig.line(1), &padded("Save+Reset"));
        rig.step(press(Buttons::LEFT));
        rig.step(press(Buttons::LEFT));
        assert_eq!(rig.line(1), &padded("Factory Reset"));
    }

    #[test]
    fn test_save_and_restart_persists() {
        let mut rig = Rig::new();
        rig.confirms(6);
        rig.step(press(Buttons::RIGHT));
        assert_eq!(rig.confirms(4), SessionStep::HaltForRestart);
        assert!(!rig.session.is_active());

        let loaded = rig.store.load(false);
        assert_eq!(loaded.outcome, LoadOutcome::Stored);
        assert_eq!(loaded.record.rom_bank, 2);
    }

    #[test]
    fn test_keep_does_not_persist() {
        let mut rig = Rig::new();
        rig.confirms(7);
        rig.step(press(Buttons::RIGHT));
        rig.confirms(2);
        rig.step(press(Buttons::RIGHT));
        assert_eq!(rig.step(confirm()), SessionStep::Finished(ExitAction::Keep));
        assert_eq!(rig.record.sound, SoundMode::Mono);
        assert_eq!(rig.store.load(false).record.sound, SoundMode::Stereo);
    }

    #[test]
    fn test_factory_reset_restores_defaults() {
        let mut rig = Rig::new();
        rig.confirms(6);
        rig.step(press(Buttons::RIGHT));
        rig.confirms(3);
        rig.step(press(Buttons::LEFT));
        rig.step(press(Buttons::LEFT));
        assert_eq!(rig.step(confirm()), SessionStep::HaltForRestart);
        assert_eq!(rig.record, ConfigRecord::factory());
        assert_eq!(rig.store.load(false).record, ConfigRecord::factory());
    }

    #[test]
    fn test_store_failure_closes_menu() {
        let mut rig = Rig::new();
        let mut flash = RamFlash::new();
        flash.fail_writes = true;
        let mut failing = ConfigStore::new(flash, ConfigRecord::factory()).unwrap();
        rig.confirms(9);
        let result = rig
            .session
            .handle(confirm(), &mut rig.record, &mut failing);
        assert!(matches!(result, Err(StoreError::Flash(_))));
        assert!(!rig.session.is_active());
    }

    #[test]
    fn test_typing_on_confirm_tick_ignored() {
        let mut rig = Rig::new();
        rig.confirms(1);
        rig.step(SessionInput {
            buttons: Buttons::CONFIRM,
            ch: b'Z',
        });
        assert_eq!(rig.record.titles[0], UNKNOWN_TITLE);
    }

    proptest! {
        #[test]
        fn prop_discard_restores_titles(
            typed in proptest::collection::vec(0x20u8..=0x7e, 0..24),
            backspaces in 0usize..20,
            bank_moves in proptest::collection::vec(any::<bool>(), 0..6),
        ) {
            let mut rig = Rig::new();
            let before = rig.record.clone();

            rig.confirms(2);
            for ch in &typed {
                rig.step(key(*ch));
            }
            for _ in 0..backspaces {
                rig.step(key(BACKSPACE));
            }
            rig.confirms(4);
            for right in bank_moves {
                rig.step(press(if right { Buttons::RIGHT } else { Buttons::LEFT }));
            }
            rig.confirms(3);
            // Save+Reset -> Use -> Discard
            rig.step(press(Buttons::RIGHT));
            rig.step(press(Buttons::RIGHT));
            prop_assert_eq!(rig.step(confirm()), SessionStep::Finished(ExitAction::Discard));
            prop_assert_eq!(rig.record, before);
        }
    }

    #[test]
    fn test_type_ab_backspace_discard() {
        let mut rig = Rig::new();
        rig.record.titles[0] = String::try_from("TOS 1.62").unwrap();
        rig.confirms(2);
        rig.step(key(b'A'));
        rig.step(key(b'B'));
        rig.step(key(BACKSPACE));
        assert_eq!(rig.record.titles[0], "TOS 1.62A");
        assert_eq!(rig.line(1), &padded("TOS 1.62A"));

        // Title(1) -> SaveConfirm, then Save+Reset -> Use -> Discard
        rig.confirms(7);
        rig.step(press(Buttons::RIGHT));
        rig.step(press(Buttons::RIGHT));
        assert_eq!(rig.step(confirm()), SessionStep::Finished(ExitAction::Discard));
        assert_eq!(rig.record.titles[0], "TOS 1.62");
    }
}
