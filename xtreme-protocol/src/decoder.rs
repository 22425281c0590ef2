//! Protocol selection
//!
//! Exactly one decoder runs for the lifetime of the firmware, chosen by a
//! board strap at boot.

use xtreme_display::DisplayFrame;

use crate::lcd::LcdEmulatorDecoder;
use crate::osd::OsdProtocolDecoder;
use crate::ring::RingConsumer;

/// Default slave address of a PCF8574 LCD backpack
pub const LCD_SLAVE_ADDRESS: u8 = 0x27;

/// Default slave address of the OSD protocol
pub const OSD_SLAVE_ADDRESS: u8 = 0x10;

/// Wire protocol spoken on the host bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Protocol {
    /// HD44780 behind a PCF8574 expander
    LcdEmulation,
    /// Custom OSD command set with status read-back
    Osd,
}

impl Protocol {
    /// Select the protocol from the state of the OSD strap
    pub fn from_strap(osd_strap: bool) -> Self {
        if osd_strap {
            Protocol::Osd
        } else {
            Protocol::LcdEmulation
        }
    }

    /// Conventional slave address for this protocol
    pub fn default_address(self) -> u8 {
        match self {
            Protocol::LcdEmulation => LCD_SLAVE_ADDRESS,
            Protocol::Osd => OSD_SLAVE_ADDRESS,
        }
    }
}

/// Outcome of one decoding pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pass {
    /// Bytes consumed from the ring
    pub bytes: usize,
    /// Older exchanges were dropped unread
    pub skipped_stale: bool,
}

/// The active decoder
#[derive(Debug, Clone)]
pub enum Decoder {
    Lcd(LcdEmulatorDecoder),
    Osd(OsdProtocolDecoder),
}

impl Decoder {
    pub fn new(protocol: Protocol) -> Self {
        match protocol {
            Protocol::LcdEmulation => Decoder::Lcd(LcdEmulatorDecoder::new()),
            Protocol::Osd => Decoder::Osd(OsdProtocolDecoder::new()),
        }
    }

    /// Button mask the host announced, OSD only
    pub fn host_buttons(&self) -> u8 {
        match self {
            Decoder::Lcd(_) => 0,
            Decoder::Osd(osd) => osd.host_buttons(),
        }
    }

    /// Decode everything pending in the ring into `frame`
    pub fn process<const D: usize, const T: usize>(
        &mut self,
        frame: &mut DisplayFrame,
        consumer: &mut RingConsumer<'_, D, T>,
    ) -> Pass {
        match self {
            Decoder::Lcd(lcd) => Pass {
                bytes: lcd.process(frame, consumer.drain()),
                skipped_stale: false,
            },
            Decoder::Osd(osd) => {
                let (bytes, skipped_stale) = osd.process(frame, consumer);
                Pass {
                    bytes,
                    skipped_stale,
                }
            }
        }
    }
}
