//! Machine control outputs
//!
//! | signal | pin | level |
//! |---|---|---|
//! | ROM select bit 0 | PB5 | `rom_bank - 1`, bit 0 |
//! | ROM select bit 1 | PB4 | `rom_bank - 1`, bit 1 |
//! | sound select | PB0 | high = stereo |
//! | boot select | PC13 | high = internal drive |
//! | reset | PB3 | driven low to hold, floating otherwise |
//!
//! The reset line is shared with the machine. It is only driven while a
//! pulse is in progress; the rest of the time it is read so that a reset
//! from the machine itself can be reported.

use embassy_stm32::gpio::{Flex, Level, Pin, Pull, Speed};
use embassy_stm32::Peri;
use xtreme_core::config::{BootSource, SoundMode};
use xtreme_core::input::LiveOutputs;
use xtreme_hal_stm32f1::gpio::{OutputPin, PushPull};

/// How long the machine is held in reset
pub const RESET_PULSE_MS: u64 = 250;

/// The machine holds its own reset line low for a while after power-up
pub const BOOT_GRACE_MS: u64 = 1000;

/// Board output pins
pub struct Board {
    rom_low: PushPull<'static>,
    rom_high: PushPull<'static>,
    sound: PushPull<'static>,
    boot: PushPull<'static>,
    reset: Flex<'static>,
    /// Release time of the pulse in progress
    release_at: Option<u64>,
}

impl Board {
    pub fn new(
        rom_low: Peri<'static, impl Pin>,
        rom_high: Peri<'static, impl Pin>,
        sound: Peri<'static, impl Pin>,
        boot: Peri<'static, impl Pin>,
        reset: Peri<'static, impl Pin>,
    ) -> Self {
        let mut reset = Flex::new(reset);
        reset.set_as_input(Pull::None);
        Self {
            rom_low: PushPull::new(rom_low, Level::Low),
            rom_high: PushPull::new(rom_high, Level::Low),
            sound: PushPull::new(sound, Level::High),
            boot: PushPull::new(boot, Level::High),
            reset,
            release_at: None,
        }
    }

    /// Drive the select lines
    pub fn apply(&mut self, live: &LiveOutputs) {
        let bank = live.rom_bank.saturating_sub(1);
        self.rom_low.set_state(bank & 0b01 != 0);
        self.rom_high.set_state(bank & 0b10 != 0);
        self.sound.set_state(live.sound == SoundMode::Stereo);
        self.boot.set_state(live.boot == BootSource::Internal);
    }

    /// Pull the reset line low; [`service`](Self::service) lets it go
    pub fn pulse_reset(&mut self, now_ms: u64) {
        self.reset.set_low();
        self.reset.set_as_output(Speed::Low);
        self.release_at = Some(now_ms + RESET_PULSE_MS);
    }

    /// Hold the machine in reset with no release scheduled
    pub fn hold_reset(&mut self) {
        self.reset.set_low();
        self.reset.set_as_output(Speed::Low);
        self.release_at = None;
    }

    /// Let go of the reset line
    pub fn release_reset(&mut self) {
        self.reset.set_as_input(Pull::None);
        self.release_at = None;
    }

    /// Finish a reset pulse once it is due
    pub fn service(&mut self, now_ms: u64) {
        if self.release_at.is_some_and(|at| now_ms >= at) {
            self.release_reset();
        }
    }

    /// The machine is holding its reset line low on its own
    pub fn external_reset(&self, now_ms: u64) -> bool {
        now_ms >= BOOT_GRACE_MS && self.release_at.is_none() && self.reset.is_low()
    }
}
