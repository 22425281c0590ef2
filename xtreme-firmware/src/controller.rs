//! Main loop controller
//!
//! One [`Controller::tick`] per loop iteration, in this order:
//!
//! 1. finish a pending reset pulse
//! 2. poll the keyboard and publish the OSD button mask
//! 3. hotkeys (menu closed only)
//! 4. debounce buttons and step the configuration menu
//! 5. report a reset held by the machine
//! 6. decode what the host sent on the bus and note its button mask
//! 7. refresh the display
//!
//! The watchdog is fed by the caller before each tick.

use defmt::*;
use xtreme_core::config::{ConfigRecord, ConfigStore};
use xtreme_core::input::{hotkey, ButtonDebouncer, LiveOutputs};
use xtreme_core::session::{ConfigSession, SessionInput, SessionStep};
use xtreme_core::traits::{KeyMap, KeySample, KeySource};
use xtreme_display::{Compositor, DisplayFrame, DisplaySink};
use xtreme_hal::flash::PageFlash;
use xtreme_protocol::{Decoder, RingConsumer, StatusBlock, BOUNDARY_RING_SIZE, DATA_RING_SIZE};

use crate::board::Board;

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum Tick {
    Running,
    /// Settings were persisted and the controller must restart
    Halt,
}

/// Everything the main loop owns
pub struct Controller<K, S, F> {
    pub keyboard: K,
    pub debouncer: ButtonDebouncer,
    pub session: ConfigSession,
    pub record: ConfigRecord,
    pub store: ConfigStore<F>,
    pub live: LiveOutputs,
    pub board: Board,
    pub status: &'static StatusBlock,
    pub decoder: Decoder,
    pub consumer: RingConsumer<'static, DATA_RING_SIZE, BOUNDARY_RING_SIZE>,
    pub bus_frame: DisplayFrame,
    /// Button feedback mask the OSD host last announced
    pub host_mask: u8,
    pub compositor: Compositor<S>,
    /// Last display write failed; only the first failure is logged
    pub display_failed: bool,
}

impl<K, S, F> Controller<K, S, F>
where
    K: KeySource + KeyMap,
    K::Error: Format,
    S: DisplaySink,
    F: PageFlash,
{
    pub fn tick(&mut self, now_ms: u64) -> Tick {
        self.board.service(now_ms);

        let sample = self.poll_keyboard();

        if !self.session.is_active() && sample.key != 0 {
            self.run_hotkey(sample.key, now_ms);
        }

        let buttons = self.debouncer.update(sample.buttons, now_ms);
        let ch = if self.session.is_active() && sample.key != 0 {
            self.keyboard.to_char(sample.key)
        } else {
            0
        };

        let step = self.session.handle(
            SessionInput { buttons, ch },
            &mut self.record,
            &mut self.store,
        );
        match step {
            Ok(SessionStep::Started) => info!("Config menu opened"),
            Ok(SessionStep::Finished(action)) => {
                info!("Config menu closed: {}", action);
                self.sync_outputs(now_ms);
            }
            Ok(SessionStep::HaltForRestart) => {
                info!("Settings saved, restarting");
                return Tick::Halt;
            }
            Ok(SessionStep::Idle | SessionStep::Active) => {}
            Err(e) => {
                warn!("Settings not saved: {}", e);
                self.sync_outputs(now_ms);
            }
        }

        if self.board.external_reset(now_ms) {
            self.compositor.notify("-- RESET --", "", now_ms);
        }

        let pass = self.decoder.process(&mut self.bus_frame, &mut self.consumer);
        if pass.skipped_stale {
            trace!("Dropped stale bus exchanges");
        }
        let host_mask = self.decoder.host_buttons();
        if host_mask != self.host_mask {
            debug!("Host button mask: {=u8:#x}", host_mask);
            self.host_mask = host_mask;
        }

        match self
            .compositor
            .refresh(now_ms, self.session.frame(), &self.bus_frame)
        {
            Ok(()) => self.display_failed = false,
            Err(e) => {
                if !self.display_failed {
                    warn!("Display write failed: {}", e);
                }
                self.display_failed = true;
            }
        }

        Tick::Running
    }

    fn poll_keyboard(&mut self) -> KeySample {
        let sample = match self.keyboard.poll(self.session.is_active()) {
            Ok(sample) => sample,
            Err(e) => {
                debug!("Keyboard receive error: {}", e);
                KeySample::default()
            }
        };

        // Button feedback goes to the host only while the menu is closed
        let host_buttons = if self.session.is_active() {
            0
        } else {
            sample.host_buttons
        };
        self.status.set_buttons(host_buttons);
        sample
    }

    fn run_hotkey(&mut self, key: u8, now_ms: u64) {
        let Some(action) = hotkey(key) else {
            return;
        };
        info!("Hotkey: {}", action);

        let notice = self.live.apply(action, &self.record);
        self.board.apply(&self.live);
        if notice.reset {
            self.board.pulse_reset(now_ms);
        }
        self.compositor
            .notify(notice.line1.as_str(), notice.line2.as_str(), now_ms);
    }

    /// Drive the outputs from the record after the menu closed
    ///
    /// A changed ROM bank or boot drive only takes effect through a reset.
    fn sync_outputs(&mut self, now_ms: u64) {
        let next = LiveOutputs::from_record(&self.record);
        if next == self.live {
            return;
        }
        let needs_reset = next.rom_bank != self.live.rom_bank || next.boot != self.live.boot;
        self.live = next;
        self.board.apply(&self.live);
        if needs_reset {
            self.board.pulse_reset(now_ms);
        }
        debug!("Outputs: {}", self.live);
    }
}
