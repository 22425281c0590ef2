//! Build-time settings
//!
//! Constants are generated by `build.rs` from `xtreme.toml`.

use heapless::String;
use xtreme_core::config::ConfigRecord;
use xtreme_core::input::DebounceConfig;
use xtreme_protocol::Protocol;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/settings.rs"));
}

pub use generated::*;

/// Main loop period
pub const TICK_MS: u64 = 10;

/// Settings restored on a blank or corrupt page and by the reset strap
pub fn factory_record() -> ConfigRecord {
    let mut record = ConfigRecord::factory();
    for (slot, text) in record.titles.iter_mut().zip(DEFAULT_TITLES) {
        // Lengths are checked by build.rs
        if let Ok(title) = String::try_from(text) {
            *slot = title;
        }
    }
    record.rom_bank = DEFAULT_ROM_BANK;
    record.sound = DEFAULT_SOUND;
    record.boot = DEFAULT_BOOT;
    record
}

pub fn debounce_config() -> DebounceConfig {
    DebounceConfig {
        first_repeat_ms: FIRST_REPEAT_MS,
        repeat_ms: REPEAT_MS,
    }
}

/// Slave address answered on the host bus
pub fn bus_address(protocol: Protocol) -> u8 {
    match protocol {
        Protocol::LcdEmulation => LCD_BUS_ADDRESS,
        Protocol::Osd => OSD_BUS_ADDRESS,
    }
}

/// Bus frame row shown on the first display line
pub fn first_row(protocol: Protocol) -> usize {
    match protocol {
        Protocol::LcdEmulation => LCD_FIRST_ROW,
        Protocol::Osd => OSD_FIRST_ROW,
    }
}
