//! GPIO wrappers for the `xtreme-hal` pin traits
//!
//! Straps are read once at boot: one pin is driven while its neighbour,
//! pulled up, is watched for a jumper.

use embassy_stm32::gpio::{Input, Level, Output, Pin, Pull, Speed};
use embassy_stm32::Peri;

pub use xtreme_hal::gpio::{pins_connected, InputPin, OutputPin};

/// Push-pull output implementing [`OutputPin`]
pub struct PushPull<'d>(Output<'d>);

impl<'d> PushPull<'d> {
    pub fn new(pin: Peri<'d, impl Pin>, initial: Level) -> Self {
        Self(Output::new(pin, initial, Speed::Low))
    }
}

impl OutputPin for PushPull<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }
}

/// Pulled-up input implementing [`InputPin`]
pub struct PulledUp<'d>(Input<'d>);

impl<'d> PulledUp<'d> {
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self(Input::new(pin, Pull::Up))
    }
}

impl InputPin for PulledUp<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// Probe a strap between `drive` and `sense`
///
/// Both pins are released again when the probe returns.
pub fn strap_fitted(drive: Peri<'_, impl Pin>, sense: Peri<'_, impl Pin>) -> bool {
    let mut drive = PushPull::new(drive, Level::High);
    let sense = PulledUp::new(sense);
    pins_connected(&mut drive, &sense, || cortex_m::asm::delay(STRAP_SETTLE_CYCLES))
}

/// Roughly 10 us at 72 MHz
const STRAP_SETTLE_CYCLES: u32 = 720;
